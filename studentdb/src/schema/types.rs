use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Allowed length of `name`, in characters
pub const NAME_LENGTH: RangeInclusive<usize> = 3..=50;

/// Allowed length of `password`, in characters
pub const PASSWORD_LENGTH: RangeInclusive<usize> = 8..=50;

/// Ages strictly between 17 and 100
pub const AGE_RANGE: RangeInclusive<i64> = 18..=99;

/// Email domains accepted at validation time. Matched exactly, case-sensitive.
pub const ALLOWED_EMAIL_DOMAINS: &[&str] = &["gmail.com", "student.com"];

/// Fold casing and separators so `Computer Science`, `computer_science`
/// and `COMPUTER-SCIENCE` compare equal.
fn normalize_token(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!(
                "value '{s}' is not one of: {}",
                Gender::ALL.map(|g| g.as_str()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Department {
    ComputerScience,
    Mathematics,
    Physics,
}

impl Department {
    pub const ALL: [Department; 3] = [
        Department::ComputerScience,
        Department::Mathematics,
        Department::Physics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::ComputerScience => "Computer Science",
            Department::Mathematics => "Mathematics",
            Department::Physics => "Physics",
        }
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "computer_science" => Ok(Department::ComputerScience),
            "mathematics" => Ok(Department::Mathematics),
            "physics" => Ok(Department::Physics),
            _ => Err(format!(
                "value '{s}' is not one of: {}",
                Department::ALL.map(|d| d.as_str()).join(", ")
            )),
        }
    }
}

macro_rules! string_enum_conversions {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

string_enum_conversions!(Gender);
string_enum_conversions!(Department);
