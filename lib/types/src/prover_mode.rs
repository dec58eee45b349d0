use serde::{Deserialize, Serialize};

/// Mode the sub-prover ran in when it produced a response.
///
/// Only `Proofless` changes how the response is aggregated: such a job carries no
/// sub-proof and therefore yields no aggregated proof either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProverMode {
    Dev,
    Partial,
    Full,
    Proofless,
    Bench,
    CheckOnly,
}

impl ProverMode {
    pub fn is_proofless(&self) -> bool {
        matches!(self, ProverMode::Proofless)
    }
}
