//! Interpellation message composer
//!
//! Builds the pre-formatted citizen-outreach message sent to a
//! community's elected officials. Pure string composition; the wording
//! of the body follows the community's global transparency grade.

use crate::score::Grade;

/// A composed interpellation message
#[derive(Debug, Clone, PartialEq)]
pub struct Letter {
    pub subject: String,
    pub body: String,
}

/// Compose the interpellation message for one community.
///
/// `global` is the community's latest global grade, `annee` the year it
/// was published for; both may be unknown when the authority has never
/// been scored.
pub fn compose(nom: &str, global: Option<Grade>, annee: Option<i64>) -> Letter {
    let subject = format!("Transparence des données publiques de {}", nom);

    let score_line = match (global, annee) {
        (Some(grade), Some(annee)) => format!(
            "Votre collectivité a obtenu la note {} au baromètre de la transparence pour l'année {}.",
            grade, annee
        ),
        (Some(grade), None) => format!(
            "Votre collectivité a obtenu la note {} au baromètre de la transparence.",
            grade
        ),
        (None, _) => "Votre collectivité n'a pas encore pu être évaluée au baromètre de la \
                      transparence, faute de données publiées."
            .to_string(),
    };

    let demande = match global {
        Some(Grade::A) => {
            "Je vous remercie pour cet engagement exemplaire et vous encourage à le maintenir \
             dans la durée."
        }
        Some(Grade::B) => {
            "Ce résultat est encourageant. Je vous invite à compléter la publication de vos \
             données pour atteindre une transparence exemplaire."
        }
        Some(Grade::C) | Some(Grade::D) => {
            "Ce résultat montre que des progrès importants restent nécessaires. Je vous demande \
             de publier l'intégralité de vos marchés publics et subventions en open data, comme \
             la loi pour une République numérique vous y oblige."
        }
        Some(Grade::E) | None => {
            "Je vous demande de publier vos marchés publics et subventions en open data, comme \
             la loi pour une République numérique vous y oblige. Les citoyens ont le droit de \
             savoir comment l'argent public est utilisé."
        }
    };

    let body = format!(
        "Madame, Monsieur,\n\n\
         En tant que citoyen·ne attentif·ve à l'usage des deniers publics, je m'intéresse à la \
         transparence des données de {nom}.\n\n\
         {score_line}\n\n\
         {demande}\n\n\
         Je vous remercie de l'attention portée à cette demande et reste disponible pour en \
         échanger.\n\n\
         Respectueusement,"
    );

    Letter { subject, body }
}
