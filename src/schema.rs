/// Column-name and answer constants for the tour survey export.
/// Single source of truth - also exported to Python via PyO3.

// ── Survey columns (positional order of the export) ────────────────────────
pub mod survey {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const NAME: &str = "Name";
    pub const EMAIL: &str = "Email";
    pub const PROGRAM: &str = "Program";
    pub const SECTION: &str = "Section";
    pub const TOUR_LOCATION_PREFERENCE: &str = "Tour_Location_Preference";
    pub const AFFORDABILITY_RATING: &str = "Affordability_Rating";
    pub const MOST_IMPORTANT_FACTOR: &str = "Most_Important_Factor";
    pub const PREVIOUS_VOTE_MATTERED: &str = "Previous_Vote_Mattered";
    pub const NON_STUDENT_FACTORS: &str = "Non_Student_Factors";
    pub const MANILA_WILLINGNESS: &str = "Manila_Willingness";
    pub const BARRIERS: &str = "Barriers";
    pub const ADDITIONAL_COMMENTS: &str = "Additional_Comments";
    pub const PREFERRED_PACKAGE: &str = "Preferred_Package";

    pub const ALL: [&str; 14] = [
        TIMESTAMP,
        NAME,
        EMAIL,
        PROGRAM,
        SECTION,
        TOUR_LOCATION_PREFERENCE,
        AFFORDABILITY_RATING,
        MOST_IMPORTANT_FACTOR,
        PREVIOUS_VOTE_MATTERED,
        NON_STUDENT_FACTORS,
        MANILA_WILLINGNESS,
        BARRIERS,
        ADDITIONAL_COMMENTS,
        PREFERRED_PACKAGE,
    ];
}

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const PROGRAM_SECTION: &str = "Program_Section";
    pub const BARRIER_PREFIX: &str = "Barrier_";
}

// ── Answer literals ─────────────────────────────────────────────────────────
pub mod affordability {
    pub const VERY_AFFORDABLE: &str = "Very Affordable";
    pub const AFFORDABLE: &str = "Affordable";
    pub const EXPENSIVE: &str = "Expensive";
    pub const VERY_EXPENSIVE: &str = "Very Expensive";

    pub const EXPENSIVE_ANSWERS: [&str; 2] = [EXPENSIVE, VERY_EXPENSIVE];
    pub const AFFORDABLE_ANSWERS: [&str; 2] = [AFFORDABLE, VERY_AFFORDABLE];
}

pub mod vote {
    pub const STRONGLY_DISAGREE: &str = "Strongly Disagree";
    pub const DISAGREE: &str = "Disagree";
    pub const AGREE: &str = "Agree";
    pub const STRONGLY_AGREE: &str = "Strongly Agree";

    pub const DISSATISFIED_ANSWERS: [&str; 2] = [DISAGREE, STRONGLY_DISAGREE];
    pub const SATISFIED_ANSWERS: [&str; 2] = [AGREE, STRONGLY_AGREE];
}

pub mod non_student {
    pub const YES: &str = "Yes";

    pub const EXTERNAL_ANSWERS: [&str; 1] = [YES];
}

pub mod willingness {
    pub const DEFINITELY: &str = "Yes, definitely";
    pub const PROBABLY: &str = "Yes, probably";

    pub const DEFINITELY_ANSWERS: [&str; 1] = [DEFINITELY];
    pub const POSITIVE_ANSWERS: [&str; 2] = [DEFINITELY, PROBABLY];
}
