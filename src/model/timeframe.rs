use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    M1,
    M2,
    M3,
    M4,
    M5,
    M6,
    M10,
    M12,
    M15,
    M20,
    M30,
    H1,
    H2,
    H3,
    H4,
    H6,
    H8,
    H12,
    D1,
    W1,
    MN1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 21] = [
        Self::M1,
        Self::M2,
        Self::M3,
        Self::M4,
        Self::M5,
        Self::M6,
        Self::M10,
        Self::M12,
        Self::M15,
        Self::M20,
        Self::M30,
        Self::H1,
        Self::H2,
        Self::H3,
        Self::H4,
        Self::H6,
        Self::H8,
        Self::H12,
        Self::D1,
        Self::W1,
        Self::MN1,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::M1 => "M1",
            Self::M2 => "M2",
            Self::M3 => "M3",
            Self::M4 => "M4",
            Self::M5 => "M5",
            Self::M6 => "M6",
            Self::M10 => "M10",
            Self::M12 => "M12",
            Self::M15 => "M15",
            Self::M20 => "M20",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
            Self::H6 => "H6",
            Self::H8 => "H8",
            Self::H12 => "H12",
            Self::D1 => "D1",
            Self::W1 => "W1",
            Self::MN1 => "MN1",
        }
    }

    /// Bar length in seconds. MN1 is approximated as 30 days.
    pub fn seconds(self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M2 => 120,
            Self::M3 => 180,
            Self::M4 => 240,
            Self::M5 => 300,
            Self::M6 => 360,
            Self::M10 => 600,
            Self::M12 => 720,
            Self::M15 => 900,
            Self::M20 => 1_200,
            Self::M30 => 1_800,
            Self::H1 => 3_600,
            Self::H2 => 7_200,
            Self::H3 => 10_800,
            Self::H4 => 14_400,
            Self::H6 => 21_600,
            Self::H8 => 28_800,
            Self::H12 => 43_200,
            Self::D1 => 86_400,
            Self::W1 => 604_800,
            Self::MN1 => 2_592_000,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Accepts the canonical code (`M15`, `H1`, `MN1`) or the reversed form
/// (`15M`, `1H`, `1MN`), plus `60M` for one hour. Case-insensitive.
impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_ascii_uppercase();
        if code.is_empty() {
            bail!("invalid timeframe '{}': expected a code like 'M15'", s);
        }
        if code == "60M" {
            return Ok(Self::H1);
        }
        if let Some(tf) = Self::ALL.iter().find(|tf| tf.code() == code) {
            return Ok(*tf);
        }

        let split = code
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(code.len());
        let (num, unit) = code.split_at(split);
        if !num.is_empty() && !unit.is_empty() {
            let canonical = format!("{}{}", unit, num);
            if let Some(tf) = Self::ALL.iter().find(|tf| tf.code() == canonical) {
                return Ok(*tf);
            }
        }
        bail!("unsupported timeframe '{}'", s)
    }
}

/// Parse a comma separated list such as `"M15,H1"`, dropping duplicates.
pub fn parse_timeframe_list(s: &str) -> Result<Vec<Timeframe>> {
    let mut out = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let tf: Timeframe = part.parse()?;
        if !out.contains(&tf) {
            out.push(tf);
        }
    }
    if out.is_empty() {
        bail!("timeframe list '{}' is empty", s);
    }
    Ok(out)
}
