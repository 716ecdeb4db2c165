#[derive(Debug, Clone, PartialEq)]
pub struct SalaryEvaluation {
    pub score: f64,
    pub details: String,
}

/// Scores a candidate's expected salary against a posting's range.
///
/// Inside `[min, max]` scores 100. Outside, the score falls linearly with the
/// distance to the nearest bound and reaches 0 at `falloff_ratio × width`.
/// A zero-width range uses `falloff_ratio × max` as span; a zero span turns
/// any gap into 0. An unknown expectation scores `neutral`.
pub fn score_salary(
    salary_min: u32,
    salary_max: u32,
    expectation: Option<f64>,
    falloff_ratio: f64,
    neutral: f64,
) -> SalaryEvaluation {
    let Some(expected) = expectation else {
        return SalaryEvaluation {
            score: neutral,
            details: "salary expectation unknown (neutral)".into(),
        };
    };

    let min = f64::from(salary_min);
    let max = f64::from(salary_max);

    if expected >= min && expected <= max {
        return SalaryEvaluation {
            score: 100.0,
            details: format!("expects {expected:.0} within {salary_min}-{salary_max}"),
        };
    }

    let gap = if expected < min {
        min - expected
    } else {
        expected - max
    };
    let width = max - min;
    let span = if width > 0.0 {
        falloff_ratio * width
    } else {
        falloff_ratio * max
    };

    let score = if span > 0.0 {
        (100.0 * (1.0 - gap / span)).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let side = if expected < min { "below" } else { "above" };
    SalaryEvaluation {
        score,
        details: format!("expects {expected:.0}, {gap:.0} {side} {salary_min}-{salary_max}"),
    }
}
