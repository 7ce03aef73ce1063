//! Database models
//!
//! Score columns stay `Option<String>` at this layer; handlers parse
//! them into [`crate::score::Grade`] when they need the semantics.

use serde::{Deserialize, Serialize};

use crate::score::{
    global_grade_opt, procurement_grade_opt, subsidy_grade, Grade,
};

/// One local authority
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Community {
    pub siren: String,
    pub nom: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub community_type: String,
    pub population: Option<i64>,
    pub code_postal: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub mp_score: Option<String>,
    pub subventions_score: Option<String>,
}

/// Yearly transparency scorecard for one authority
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BaremeEntry {
    pub siren: String,
    pub annee: i64,
    pub mp_score: Option<String>,
    pub subventions_score: Option<String>,
    pub global_score: Option<String>,
    pub mp_publies_inf40k: Option<bool>,
    pub mp_publies_sup40k: Option<bool>,
    pub mp_champs_renseignes: Option<i64>,
    pub mp_delai_respecte: Option<bool>,
    pub subventions_detaillees: Option<f64>,
    pub budget_total: Option<f64>,
}

impl BaremeEntry {
    /// Procurement grade: the published score wins; when absent it is
    /// derived from the raw publication signals.
    pub fn effective_mp_grade(&self) -> Option<Grade> {
        if let Some(stored) = &self.mp_score {
            return stored.parse().ok();
        }
        procurement_grade_opt(
            self.mp_publies_inf40k,
            self.mp_publies_sup40k,
            self.mp_champs_renseignes
                .and_then(|n| u8::try_from(n).ok()),
            self.mp_delai_respecte,
        )
    }

    /// Subsidy grade: the published score wins; when absent it is
    /// derived from the itemized amount and total budget.
    pub fn effective_subventions_grade(&self) -> Option<Grade> {
        if let Some(stored) = &self.subventions_score {
            return stored.parse().ok();
        }
        subsidy_grade(self.subventions_detaillees, self.budget_total)
    }

    /// Global grade: stored value wins (published scores are immutable);
    /// derived from the two axis grades only when absent.
    pub fn effective_global_grade(&self) -> Option<Grade> {
        if let Some(stored) = &self.global_score {
            return stored.parse().ok();
        }
        global_grade_opt(self.effective_mp_grade(), self.effective_subventions_grade())
    }
}

/// One procurement contract record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarchePublic {
    pub id: i64,
    pub acheteur_siren: String,
    pub objet: String,
    pub montant: f64,
    pub annee_notification: i64,
    pub code_cpv: Option<String>,
    pub titulaire: Option<String>,
    pub titulaire_siren: Option<String>,
}

/// One subsidy record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subvention {
    pub id: i64,
    pub attribuant_siren: String,
    pub beneficiaire: String,
    pub objet: Option<String>,
    pub montant: f64,
    pub annee: i64,
}

/// Elected official / interpellation recipient
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Elu {
    pub siren: String,
    pub nom: String,
    pub fonction: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_entry() -> BaremeEntry {
        BaremeEntry {
            siren: "213105554".to_string(),
            annee: 2024,
            mp_score: None,
            subventions_score: None,
            global_score: None,
            mp_publies_inf40k: None,
            mp_publies_sup40k: None,
            mp_champs_renseignes: None,
            mp_delai_respecte: None,
            subventions_detaillees: None,
            budget_total: None,
        }
    }

    #[test]
    fn test_stored_scores_win_over_signals() {
        let entry = BaremeEntry {
            mp_score: Some("B".to_string()),
            // Signals alone would grade A
            mp_publies_inf40k: Some(true),
            mp_publies_sup40k: Some(true),
            mp_champs_renseignes: Some(10),
            mp_delai_respecte: Some(true),
            ..blank_entry()
        };
        assert_eq!(entry.effective_mp_grade(), Some(Grade::B));
    }

    #[test]
    fn test_mp_grade_derived_from_signals() {
        let entry = BaremeEntry {
            mp_publies_inf40k: Some(false),
            mp_publies_sup40k: Some(true),
            ..blank_entry()
        };
        assert_eq!(entry.effective_mp_grade(), Some(Grade::D));
    }

    #[test]
    fn test_subventions_grade_derived_from_amounts() {
        let entry = BaremeEntry {
            subventions_detaillees: Some(960_000.0),
            budget_total: Some(1_000_000.0),
            ..blank_entry()
        };
        assert_eq!(entry.effective_subventions_grade(), Some(Grade::A));
    }

    #[test]
    fn test_global_grade_derived_when_absent() {
        let entry = BaremeEntry {
            mp_score: Some("A".to_string()),
            subventions_score: Some("C".to_string()),
            ..blank_entry()
        };
        assert_eq!(entry.effective_global_grade(), Some(Grade::B));
    }

    #[test]
    fn test_stored_global_grade_is_immutable() {
        let entry = BaremeEntry {
            mp_score: Some("A".to_string()),
            subventions_score: Some("A".to_string()),
            global_score: Some("C".to_string()),
            ..blank_entry()
        };
        assert_eq!(entry.effective_global_grade(), Some(Grade::C));
    }

    #[test]
    fn test_unknown_when_nothing_communicated() {
        let entry = blank_entry();
        assert_eq!(entry.effective_mp_grade(), None);
        assert_eq!(entry.effective_subventions_grade(), None);
        assert_eq!(entry.effective_global_grade(), None);
    }
}
