/// Fixed grading scales and code alias tables
///
/// The ordinal scales are domain knowledge and are never derived from the
/// inventory data. Alias tables map request shorthand onto the canonical
/// values stored in the snapshot.
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Color grades, best to worst
pub const COLOR_SCALE: &[&str] = &["D", "E", "F", "G", "H", "I", "J", "K", "L", "M"];

/// Clarity grades, best to worst
pub const CLARITY_SCALE: &[&str] = &["IF", "VVS1", "VVS2", "VS1", "VS2", "SI1", "SI2", "SI3", "I1", "I2", "I3"];

/// An ordinal grading scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Color,
    Clarity,
}

impl Scale {
    pub fn grades(&self) -> &'static [&'static str] {
        match self {
            Scale::Color => COLOR_SCALE,
            Scale::Clarity => CLARITY_SCALE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Color => "color",
            Scale::Clarity => "clarity",
        }
    }

    /// Position of a grade on the scale (case-insensitive), 0 = best
    pub fn index_of(&self, grade: &str) -> Option<usize> {
        let grade = grade.trim();
        self.grades().iter().position(|g| g.eq_ignore_ascii_case(grade))
    }
}

lazy_static! {
    /// Shape shorthand -> canonical shape name
    static ref SHAPE_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        for code in ["RD", "BR", "RBC", "ROUND"] {
            m.insert(code, "Round");
        }
        for code in ["CU", "CB", "CMB", "CUSHION"] {
            m.insert(code, "Cushion");
        }
        for code in ["AS", "SQEM", "ASSCHER"] {
            m.insert(code, "Asscher");
        }
        for code in ["PS", "PE", "PEAR"] {
            m.insert(code, "Pear");
        }
        for code in ["OV", "OVAL"] {
            m.insert(code, "Oval");
        }
        for code in ["PR", "PC", "PRINCESS"] {
            m.insert(code, "Princess");
        }
        for code in ["EM", "EC", "EMERALD"] {
            m.insert(code, "Emerald");
        }
        for code in ["MQ", "MARQUISE"] {
            m.insert(code, "Marquise");
        }
        for code in ["HS", "HT", "HEART"] {
            m.insert(code, "Heart");
        }
        for code in ["RAD", "RA", "RADIANT"] {
            m.insert(code, "Radiant");
        }
        m
    };

    /// Canonical fluorescence code -> every spelling that means the same thing
    static ref FLUORESCENCE_SYNONYMS: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("NON", &["NONE", "NON", "N"]);
        m.insert("FNT", &["FAINT", "FNT", "F"]);
        m.insert("SLT", &["SLIGHT", "SLT", "SL"]);
        m.insert("MED", &["MEDIUM", "MED", "M"]);
        m.insert("STR", &["STRONG", "STR", "STG"]);
        m.insert("VST", &["VERY STRONG", "VST", "VSTG"]);
        m
    };
}

/// Resolve a requested shape code to the value compared against the snapshot.
/// Unknown codes pass through unchanged.
pub fn resolve_shape(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    match SHAPE_ALIASES.get(upper.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => code.trim().to_string(),
    }
}

/// Expand a requested fluorescence code into upper-cased accepted spellings.
/// Unknown codes expand to themselves.
pub fn expand_fluorescence(code: &str) -> Vec<String> {
    let upper = code.trim().to_uppercase();
    match FLUORESCENCE_SYNONYMS.get(upper.as_str()) {
        Some(synonyms) => synonyms.iter().map(|s| s.to_string()).collect(),
        None => vec![upper],
    }
}
