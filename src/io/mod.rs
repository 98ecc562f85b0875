use crate::errors::GeometryError;

mod obj;

#[cfg(feature = "stl-io")]
mod stl;

mod stl_ascii;

#[derive(Debug)]
pub enum IoError {
    StdIo(std::io::Error),
    ParseFloat(std::num::ParseFloatError),
    ParseInt(std::num::ParseIntError),

    MalformedInput(String),

    Geometry(GeometryError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use IoError::*;

        match self {
            StdIo(error) => write!(f, "std::io::Error: {error}"),
            ParseFloat(error) => write!(f, "Could not parse float: {error}"),
            ParseInt(error) => write!(f, "Could not parse integer: {error}"),

            MalformedInput(msg) => write!(f, "Input is malformed: {msg}"),

            Geometry(error) => write!(f, "Invalid geometry: {error}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::StdIo(error) => Some(error),
            IoError::ParseFloat(error) => Some(error),
            IoError::ParseInt(error) => Some(error),
            IoError::Geometry(error) => Some(error),
            IoError::MalformedInput(_) => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(value: std::io::Error) -> Self {
        Self::StdIo(value)
    }
}

impl From<std::num::ParseFloatError> for IoError {
    fn from(value: std::num::ParseFloatError) -> Self {
        Self::ParseFloat(value)
    }
}

impl From<std::num::ParseIntError> for IoError {
    fn from(value: std::num::ParseIntError) -> Self {
        Self::ParseInt(value)
    }
}

impl From<GeometryError> for IoError {
    fn from(value: GeometryError) -> Self {
        Self::Geometry(value)
    }
}
