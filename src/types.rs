use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const NUM_CLASSES: usize = 5;

/// Porn probability above which an image is flagged.
pub const PORN_THRESHOLD: f32 = 0.5;
/// Sexy probability above which an image is flagged.
pub const SEXY_THRESHOLD: f32 = 0.4;
/// Hentai probability above which an image is flagged.
pub const HENTAI_THRESHOLD: f32 = 0.4;

// Checked in this order; the first class over its threshold is reported.
const NSFW_RULES: [(NsfwClass, f32); 3] = [
    (NsfwClass::Porn, PORN_THRESHOLD),
    (NsfwClass::Sexy, SEXY_THRESHOLD),
    (NsfwClass::Hentai, HENTAI_THRESHOLD),
];

/// Output classes of the model, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NsfwClass {
    Drawings,
    Hentai,
    Neutral,
    Porn,
    Sexy,
}

impl NsfwClass {
    pub const ALL: [NsfwClass; NUM_CLASSES] = [
        NsfwClass::Drawings,
        NsfwClass::Hentai,
        NsfwClass::Neutral,
        NsfwClass::Porn,
        NsfwClass::Sexy,
    ];

    pub const fn index(self) -> usize {
        match self {
            NsfwClass::Drawings => 0,
            NsfwClass::Hentai => 1,
            NsfwClass::Neutral => 2,
            NsfwClass::Porn => 3,
            NsfwClass::Sexy => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            NsfwClass::Drawings => "drawings",
            NsfwClass::Hentai => "hentai",
            NsfwClass::Neutral => "neutral",
            NsfwClass::Porn => "porn",
            NsfwClass::Sexy => "sexy",
        }
    }
}

impl TryFrom<usize> for NsfwClass {
    type Error = anyhow::Error;

    fn try_from(value: usize) -> Result<Self> {
        match NsfwClass::ALL.get(value) {
            Some(class) => Ok(*class),
            None => bail!("Invalid class index {value}"),
        }
    }
}

impl fmt::Display for NsfwClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Class probabilities for a single image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    probs: [f32; NUM_CLASSES],
}

impl Prediction {
    pub fn new(probs: [f32; NUM_CLASSES]) -> Self {
        Self { probs }
    }

    /// Builds a prediction from raw model output, which must hold exactly
    /// one finite value per class.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let probs: [f32; NUM_CLASSES] = match values.try_into() {
            Ok(probs) => probs,
            Err(_) => bail!(
                "Expected {NUM_CLASSES} class probabilities, got {}",
                values.len()
            ),
        };

        if let Some(index) = probs.iter().position(|p| !p.is_finite()) {
            bail!(
                "Non-finite probability {} for class {}",
                probs[index],
                NsfwClass::ALL[index]
            );
        }

        Ok(Self { probs })
    }

    pub fn probs(&self) -> &[f32; NUM_CLASSES] {
        &self.probs
    }

    pub fn probability(&self, class: NsfwClass) -> f32 {
        self.probs[class.index()]
    }

    /// First class whose probability is strictly above its threshold.
    pub fn flagged_class(&self) -> Option<NsfwClass> {
        NSFW_RULES
            .iter()
            .find(|(class, threshold)| self.probability(*class) > *threshold)
            .map(|(class, _)| *class)
    }

    pub fn is_nsfw(&self) -> bool {
        self.flagged_class().is_some()
    }
}

/// Same layout as a batch of one: `[[p0 p1 p2 p3 p4]]`.
impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[[")?;
        for (i, p) in self.probs.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{p:.8}")?;
        }
        f.write_str("]]")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub path: String,
    pub is_nsfw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probs: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_class: Option<NsfwClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
