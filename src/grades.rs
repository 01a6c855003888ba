//! Grade taxonomy and the narrative attached to each grade.

/// Narrative content for one sustainability grade.
#[derive(Debug, PartialEq, Eq)]
pub struct GradeProfile {
    pub interpretation: &'static str,
    pub icon: &'static str,
    pub recommendations: &'static [&'static str],
    /// Impact sentence with `{monthly_co2_kg}`, `{km}` and `{bulb_hours}` placeholders.
    pub impact_template: &'static str,
    pub comments: &'static str,
}

const FOOTPRINT_IMPACT: &str = "Your website generates approximately {monthly_co2_kg} kg CO₂ monthly — \
equivalent to driving about {km} km in a petrol car or powering a 10W LED bulb for around {bulb_hours} hours.";

static GRADE_A: GradeProfile = GradeProfile {
    interpretation: "Excellent digital sustainability performance.",
    icon: "🌳🌳🌳",
    recommendations: &[
        "Maintain current optimisation efforts.",
        "Monitor regularly for performance changes.",
    ],
    impact_template: FOOTPRINT_IMPACT,
    comments: "Keep up the excellent sustainable practices!",
};

static GRADE_B: GradeProfile = GradeProfile {
    interpretation: "Good with room for improvement.",
    icon: "🌳🌳",
    recommendations: &[
        "Audit third-party scripts (e.g., analytics, ads).",
        "Use next-gen image formats like WebP or AVIF.",
        "Lazy-load non-critical assets.",
    ],
    impact_template: FOOTPRINT_IMPACT,
    comments: "Consider addressing these areas to improve further.",
};

static GRADE_C: GradeProfile = GradeProfile {
    interpretation: "Moderate performance; optimisation recommended.",
    icon: "🌳",
    recommendations: &["Minimise HTTP requests.", "Optimise JavaScript and CSS delivery."],
    impact_template: FOOTPRINT_IMPACT,
    comments: "Opportunities exist to improve sustainability.",
};

static GRADE_D: GradeProfile = GradeProfile {
    interpretation: "Below average; needs attention.",
    icon: "🍂",
    recommendations: &["Reduce page size significantly.", "Remove unused scripts and styles."],
    impact_template: FOOTPRINT_IMPACT,
    comments: "Urgent attention recommended to reduce environmental impact.",
};

static GRADE_E: GradeProfile = GradeProfile {
    interpretation: "Poor performance; urgent improvements required.",
    icon: "🔥",
    recommendations: &[
        "Conduct a full performance and carbon audit.",
        "Engage with sustainability experts.",
    ],
    impact_template: FOOTPRINT_IMPACT,
    comments: "Immediate improvements are necessary.",
};

static GRADE_UNKNOWN: GradeProfile = GradeProfile {
    interpretation: "Sustainability grade data unavailable.",
    icon: "❓",
    recommendations: &[],
    impact_template: "No impact data available.",
    comments: "",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl Grade {
    pub const ALL: [Grade; 6] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E, Grade::Unknown];

    /// Resolve a datastore grade label. Labels outside the taxonomy map to `Unknown`.
    pub fn from_label(label: &str) -> Grade {
        Grade::ALL
            .into_iter()
            .find(|g| g.label() == label)
            .unwrap_or(Grade::Unknown)
    }

    /// Exact label used in the datastore's select option.
    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "A (🌳🌳🌳)",
            Grade::B => "B (🌳🌳)",
            Grade::C => "C (🌳)",
            Grade::D => "D (🍂)",
            Grade::E => "E (🔥)",
            Grade::Unknown => "Unknown",
        }
    }

    pub fn profile(self) -> &'static GradeProfile {
        match self {
            Grade::A => &GRADE_A,
            Grade::B => &GRADE_B,
            Grade::C => &GRADE_C,
            Grade::D => &GRADE_D,
            Grade::E => &GRADE_E,
            Grade::Unknown => &GRADE_UNKNOWN,
        }
    }
}

/// Profile for a grade label, falling back to the `Unknown` profile.
pub fn lookup(label: &str) -> &'static GradeProfile {
    Grade::from_label(label).profile()
}

impl GradeProfile {
    /// Fill the impact template with already-formatted figures.
    pub fn impact(&self, monthly_co2_kg: &str, km: i64, bulb_hours: i64) -> String {
        self.impact_template
            .replace("{monthly_co2_kg}", monthly_co2_kg)
            .replace("{km}", &km.to_string())
            .replace("{bulb_hours}", &bulb_hours.to_string())
    }
}
