use std::fmt::Debug;

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum SensorClass {
    Temperature,
}

impl AsRef<str> for SensorClass {
    fn as_ref(&self) -> &str {
        match self {
            Self::Temperature => "temperature",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum BinarySensorClass {
    Running,
}

impl AsRef<str> for BinarySensorClass {
    fn as_ref(&self) -> &str {
        match self {
            Self::Running => "running",
        }
    }
}
