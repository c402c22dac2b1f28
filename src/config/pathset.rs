use core::str::{FromStr, Split};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    UnknownPath,
    ExpectValue,
    InvalidValue,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::UnknownPath => "Specified path not exists or invalid",
            Self::ExpectValue => "Expect value",
            Self::InvalidValue => "Value not valid",
        };
        write!(f, "{}", err_string)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Value<'a>(pub Option<&'a str>);

impl<'a> Value<'a> {
    pub fn of(string: &'a str) -> Value<'a> {
        Value(Some(string))
    }

    pub fn parse<T: FromStr>(&self) -> Result<T, Error> {
        match self.0 {
            Some(s) => FromStr::from_str(s.trim()).map_err(|_| Error::InvalidValue),
            None => Err(Error::ExpectValue),
        }
    }

    /// Absent value falls back to `or`
    pub fn parse_or<T: FromStr>(&self, or: T) -> Result<T, Error> {
        match self.0 {
            Some(_) => self.parse(),
            None => Ok(or),
        }
    }

    /// Gains and limits are non-negative and finite
    pub fn parse_gain(&self) -> Result<f32, Error> {
        let value: f32 = self.parse()?;
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidValue);
        }
        Ok(value)
    }
}

#[derive(Clone, Debug)]
pub struct Path<'a>(Split<'a, char>);

impl<'a> Path<'a> {
    pub fn new(split: Split<'a, char>) -> Self {
        Self(split)
    }

    pub fn str(&mut self) -> Result<&'a str, Error> {
        self.0.next().ok_or(Error::UnknownPath)
    }
}

impl<'a> From<&'a str> for Path<'a> {
    fn from(path: &'a str) -> Self {
        Self(path.trim_matches('/').split('/'))
    }
}

/// Implemented by parameter groups, which are interior mutable
pub trait PathSet {
    fn set(&self, path: Path, value: Value) -> Result<(), Error>;
}
