/// Explicit database type of a bound parameter.
///
/// Type hints travel positionally alongside the parameter list and let the
/// driver prepare a statement with fixed parameter types, which matters for
/// NULL parameters or when the server would otherwise infer a narrower type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Integer,
    BigInt,
    Double,
    Text,
    Boolean,
}

impl ParamType {
    /// PostgreSQL type OID for this parameter type.
    pub fn oid(self) -> u32 {
        match self {
            ParamType::Boolean => 16,
            ParamType::BigInt => 20,
            ParamType::Integer => 23,
            ParamType::Text => 25,
            ParamType::Double => 701,
        }
    }
}
