use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    Size,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    B,
    KB,
    MB,
    GB,
    TB,
    Ms,
    S,
    Min,
    H,
    D,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("invalid unit \"{0}\"")]
    InvalidUnit(String),
    #[error("{0}")]
    InvalidValue(String),
}

const KB: u64 = 1024;
const SIZE_UNITS: [Unit; 5] = [Unit::TB, Unit::GB, Unit::MB, Unit::KB, Unit::B];
const TIME_UNITS: [Unit; 4] = [Unit::D, Unit::H, Unit::Min, Unit::S];

impl Unit {
    pub fn class(&self) -> UnitClass {
        match self {
            Unit::B | Unit::KB | Unit::MB | Unit::GB | Unit::TB => UnitClass::Size,
            Unit::Ms | Unit::S | Unit::Min | Unit::H | Unit::D => UnitClass::Time,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::B => "B",
            Unit::KB => "KB",
            Unit::MB => "MB",
            Unit::GB => "GB",
            Unit::TB => "TB",
            Unit::Ms => "ms",
            Unit::S => "s",
            Unit::Min => "min",
            Unit::H => "h",
            Unit::D => "d",
        }
    }

    /// Base units per one of this unit. Milliseconds are below the base
    /// unit and handled separately by [`to_base`].
    fn factor(&self) -> u64 {
        match self {
            Unit::B | Unit::S | Unit::Ms => 1,
            Unit::KB => KB,
            Unit::MB => KB * KB,
            Unit::GB => KB * KB * KB,
            Unit::TB => KB * KB * KB * KB,
            Unit::Min => 60,
            Unit::H => 60 * 60,
            Unit::D => 24 * 60 * 60,
        }
    }

    pub fn from_suffix(class: UnitClass, suffix: &str) -> Result<Unit, UnitError> {
        let unit = match class {
            UnitClass::Size => match suffix.to_ascii_uppercase().as_str() {
                "B" => Some(Unit::B),
                "KB" => Some(Unit::KB),
                "MB" => Some(Unit::MB),
                "GB" => Some(Unit::GB),
                "TB" => Some(Unit::TB),
                _ => None,
            },
            UnitClass::Time => match suffix.to_ascii_lowercase().as_str() {
                "ms" => Some(Unit::Ms),
                "s" => Some(Unit::S),
                "min" => Some(Unit::Min),
                "h" => Some(Unit::H),
                "d" => Some(Unit::D),
                _ => None,
            },
        };
        unit.ok_or_else(|| UnitError::InvalidUnit(suffix.to_string()))
    }
}

impl UnitClass {
    pub fn base_unit(&self) -> Unit {
        match self {
            UnitClass::Size => Unit::B,
            UnitClass::Time => Unit::S,
        }
    }
}

pub fn to_base(value: u64, unit: Unit) -> Result<u64, UnitError> {
    if unit == Unit::Ms {
        if value % 1000 != 0 {
            return Err(UnitError::InvalidValue(format!(
                "{}ms is not a whole number of seconds",
                value
            )));
        }
        return Ok(value / 1000);
    }
    value.checked_mul(unit.factor()).ok_or_else(|| {
        UnitError::InvalidValue(format!("{}{} is out of range", value, unit.suffix()))
    })
}

/// Picks the largest unit that divides `base` evenly. Zero is rendered in
/// the base unit.
pub fn from_base(base: u64, class: UnitClass) -> (u64, &'static str) {
    let candidates: &[Unit] = match class {
        UnitClass::Size => &SIZE_UNITS,
        UnitClass::Time => &TIME_UNITS,
    };
    if base != 0 {
        for unit in candidates {
            if base % unit.factor() == 0 {
                return (base / unit.factor(), unit.suffix());
            }
        }
    }
    (base, class.base_unit().suffix())
}

pub fn format_base(base: u64, class: UnitClass) -> String {
    let (value, suffix) = from_base(base, class);
    format!("{}{}", value, suffix)
}

/// Parses `<digits>[ ]<suffix>`. A bare number is read in `default_unit`;
/// without one it is rejected.
pub fn parse_magnitude(
    text: &str,
    class: UnitClass,
    default_unit: Option<Unit>,
) -> Result<u64, UnitError> {
    let text = text.trim();
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if digits_end == 0 {
        return Err(UnitError::InvalidValue(format!(
            "{:?} is not an unsigned number",
            text
        )));
    }
    let value: u64 = text[..digits_end]
        .parse()
        .map_err(|_| UnitError::InvalidValue(format!("{} is out of range", &text[..digits_end])))?;
    let suffix = text[digits_end..].trim_start();
    let unit = if suffix.is_empty() {
        default_unit.ok_or_else(|| UnitError::InvalidUnit(String::new()))?
    } else {
        Unit::from_suffix(class, suffix)?
    };
    to_base(value, unit)
}
