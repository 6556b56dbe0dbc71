use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum width of the numeric suffix.
const SUFFIX_WIDTH: usize = 4;
const RANDOM_SUFFIX_LEN: usize = 4;

/// How the next identifier is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberingPolicy {
    /// `PREFIX-NNNN`, continuing from the highest existing suffix.
    #[default]
    PrefixIncrement,
    /// `YYYY-NNNN`, continuing from the highest suffix of the current year.
    YearPrefix,
    /// `YYYYMMDD-XXXX` with a random base-36 tail. No collision check.
    DateRandom,
}

/// A configured policy together with its prefix and increment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberingScheme {
    #[serde(default)]
    pub policy: NumberingPolicy,
    pub prefix: String,
    #[serde(default = "default_step")]
    pub step: u32,
}

fn default_step() -> u32 {
    1
}

impl NumberingScheme {
    pub fn new(policy: NumberingPolicy, prefix: impl Into<String>, step: u32) -> Self {
        Self {
            policy,
            prefix: prefix.into(),
            step,
        }
    }

    pub fn prefix_increment(prefix: impl Into<String>) -> Self {
        Self::new(NumberingPolicy::PrefixIncrement, prefix, 1)
    }

    /// Propose the next number given every number already in use.
    pub fn next<I, S>(&self, existing: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        next_number(existing, self.policy, &self.prefix, self.step)
    }
}

/// Propose the next number using the local calendar date and thread RNG.
pub fn next_number<I, S>(existing: I, policy: NumberingPolicy, prefix: &str, step: u32) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    next_number_with(
        existing,
        policy,
        prefix,
        step,
        Local::now().date_naive(),
        &mut rand::thread_rng(),
    )
}

/// Propose the next number with an explicit date and random source.
pub fn next_number_with<I, S, R>(
    existing: I,
    policy: NumberingPolicy,
    prefix: &str,
    step: u32,
    today: NaiveDate,
    rng: &mut R,
) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    R: Rng,
{
    match policy {
        NumberingPolicy::PrefixIncrement => increment(existing, prefix, step),
        NumberingPolicy::YearPrefix => increment(existing, &today.year().to_string(), step),
        NumberingPolicy::DateRandom => {
            format!("{}-{}", today.format("%Y%m%d"), random_suffix(rng))
        }
    }
}

fn increment<I, S>(existing: I, prefix: &str, step: u32) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let step = u64::from(step.max(1));
    let scope = format!("{prefix}-");

    let next = existing
        .into_iter()
        .filter_map(|n| numeric_suffix(n.as_ref(), &scope))
        .max()
        .map_or(step, |max| max.saturating_add(step));

    format!("{prefix}-{next:0width$}", width = SUFFIX_WIDTH)
}

/// Leading decimal digits after `scope`, if any.
fn numeric_suffix(number: &str, scope: &str) -> Option<u64> {
    let rest = number.strip_prefix(scope)?;
    let digits: &str = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    digits.parse().ok()
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..RANDOM_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
