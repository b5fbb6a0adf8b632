// Agrégats du tableau de bord. Les calculs sont faits côté service sur des
// itérateurs, les mêmes helpers servent aux quatre familles d'objets.
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc, Weekday};
use sea_orm::*;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::models::dto::{
    CompteurJournalier, CompteurMensuel, CompteurParStatus, StatistiquesDemandes,
    StatistiquesInscriptions, StatistiquesPaiements, StatistiquesReclamations,
    StatistiquesResponse,
};
use crate::models::enums::StatusReclamation;
use crate::models::{demande, inscription, paiement, reclamation};

const JOURS_SEMAINE: [(Weekday, &str); 7] = [
    (Weekday::Mon, "LUNDI"),
    (Weekday::Tue, "MARDI"),
    (Weekday::Wed, "MERCREDI"),
    (Weekday::Thu, "JEUDI"),
    (Weekday::Fri, "VENDREDI"),
    (Weekday::Sat, "SAMEDI"),
    (Weekday::Sun, "DIMANCHE"),
];

pub struct StatistiqueService;

impl StatistiqueService {
    pub async fn get_statistiques(
        db: &DatabaseConnection,
    ) -> Result<StatistiquesResponse, ServiceError> {
        let today = Utc::now().date_naive();

        let demandes = demande::Entity::find().all(db).await?;
        let inscriptions = inscription::Entity::find().all(db).await?;
        let paiements = paiement::Entity::find().all(db).await?;
        let reclamations = reclamation::Entity::find().all(db).await?;

        tracing::info!(
            "Computing statistics over {} demandes, {} inscriptions, {} paiements, {} reclamations",
            demandes.len(),
            inscriptions.len(),
            paiements.len(),
            reclamations.len()
        );

        let traitees = reclamations
            .iter()
            .filter(|r| r.status == StatusReclamation::Traitee)
            .count() as u64;

        Ok(StatistiquesResponse {
            demandes: StatistiquesDemandes {
                par_status: count_by_status(demandes.iter().map(|d| d.status)),
                temps_moyen_traitement_jours: average_processing_days(
                    demandes.iter().map(|d| (d.date_creation, d.date_traitement)),
                ),
            },
            inscriptions: StatistiquesInscriptions {
                par_status: count_by_status(inscriptions.iter().map(|i| i.status)),
                temps_moyen_traitement_jours: average_processing_days(
                    inscriptions
                        .iter()
                        .map(|i| (i.date_creation, i.date_confirmation)),
                ),
                par_mois: monthly_counts(
                    inscriptions
                        .iter()
                        .map(|i| (i.date_creation, i.type_inscription)),
                    today.year(),
                ),
            },
            paiements: StatistiquesPaiements {
                par_status: count_by_status(paiements.iter().map(|p| p.status)),
                temps_moyen_traitement_jours: average_processing_days(
                    paiements.iter().map(|p| (p.date_creation, p.date_paiement)),
                ),
                par_mois: monthly_counts(
                    paiements.iter().map(|p| (p.date_creation, p.type_paiement)),
                    today.year(),
                ),
            },
            reclamations: StatistiquesReclamations {
                par_status: count_by_status(reclamations.iter().map(|r| r.status)),
                temps_moyen_traitement_jours: average_processing_days(
                    reclamations
                        .iter()
                        .map(|r| (r.date_creation, r.date_traitement)),
                ),
                par_jour_semaine: weekday_counts(
                    reclamations.iter().map(|r| r.date_creation),
                    today,
                ),
                taux_satisfaction: satisfaction_rate(reclamations.len() as u64, traitees),
            },
        })
    }
}

/// Comptage par statut. Toutes les variantes apparaissent, dans l'ordre de
/// déclaration de l'enum, y compris celles à zéro.
pub fn count_by_status<S>(statuses: impl Iterator<Item = S>) -> Vec<CompteurParStatus>
where
    S: ActiveEnum<Value = String> + Iterable + PartialEq,
{
    let values: Vec<S> = statuses.collect();
    S::iter()
        .map(|variant| {
            let total = values.iter().filter(|s| **s == variant).count() as u64;
            CompteurParStatus {
                status: variant.to_value(),
                total,
            }
        })
        .collect()
}

/// Moyenne en jours entiers entre création et décision. Les lignes encore en
/// attente ne comptent pas ; None si rien n'a été décidé.
pub fn average_processing_days(
    rows: impl Iterator<Item = (NaiveDateTime, Option<NaiveDateTime>)>,
) -> Option<f64> {
    let mut total_days: i64 = 0;
    let mut decided: u64 = 0;
    for (created, decision) in rows {
        if let Some(decided_at) = decision {
            total_days += (decided_at.date() - created.date()).num_days();
            decided += 1;
        }
    }
    if decided == 0 {
        None
    } else {
        Some(total_days as f64 / decided as f64)
    }
}

/// Volumes mensuels par type pour l'année donnée. Seuls les couples
/// (mois, type) non vides sont retournés, triés par mois puis par type.
pub fn monthly_counts<T>(
    rows: impl Iterator<Item = (NaiveDateTime, T)>,
    year: i32,
) -> Vec<CompteurMensuel<T>>
where
    T: ActiveEnum<Value = String> + Iterable + PartialEq + Copy + serde::Serialize,
{
    let in_year: Vec<(u32, T)> = rows
        .filter(|(created, _)| created.year() == year)
        .map(|(created, kind)| (created.month(), kind))
        .collect();

    let mut out = Vec::new();
    for mois in 1..=12u32 {
        for kind in T::iter() {
            let total = in_year
                .iter()
                .filter(|(m, k)| *m == mois && *k == kind)
                .count() as u64;
            if total > 0 {
                out.push(CompteurMensuel { mois, kind, total });
            }
        }
    }
    out
}

/// Réclamations reçues chaque jour de la semaine ISO contenant `today`.
/// Les sept jours sont toujours présents, de lundi à dimanche.
pub fn weekday_counts(
    dates: impl Iterator<Item = NaiveDateTime>,
    today: NaiveDate,
) -> Vec<CompteurJournalier> {
    let monday = today.week(Weekday::Mon).first_day();
    let next_monday = monday + chrono::Duration::days(7);

    let mut per_day: HashMap<Weekday, u64> = HashMap::new();
    for created in dates {
        let date = created.date();
        if date >= monday && date < next_monday {
            *per_day.entry(date.weekday()).or_insert(0) += 1;
        }
    }

    JOURS_SEMAINE
        .iter()
        .map(|(weekday, jour)| CompteurJournalier {
            jour: (*jour).to_string(),
            total: per_day.get(weekday).copied().unwrap_or(0),
        })
        .collect()
}

/// Part des réclamations traitées, en pourcentage. None sans réclamation.
pub fn satisfaction_rate(total: u64, traitees: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(traitees as f64 / total as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{StatusDemande, TypeInscription};

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_count_by_status_includes_empty_variants() {
        let counts = count_by_status(
            [
                StatusDemande::EnAttente,
                StatusDemande::EnAttente,
                StatusDemande::Approuvee,
            ]
            .into_iter(),
        );

        assert_eq!(
            counts,
            vec![
                CompteurParStatus {
                    status: "EN_ATTENTE".into(),
                    total: 2
                },
                CompteurParStatus {
                    status: "APPROUVEE".into(),
                    total: 1
                },
                CompteurParStatus {
                    status: "REFUSEE".into(),
                    total: 0
                },
            ]
        );
    }

    #[test]
    fn test_average_ignores_undecided_rows() {
        let rows = vec![
            (dt(2025, 1, 1), Some(dt(2025, 1, 3))),
            (dt(2025, 1, 1), Some(dt(2025, 1, 5))),
            (dt(2025, 1, 1), None),
        ];
        // (2 + 4) / 2
        assert_eq!(average_processing_days(rows.into_iter()), Some(3.0));
    }

    #[test]
    fn test_average_is_none_without_decisions() {
        let rows = vec![(dt(2025, 1, 1), None)];
        assert_eq!(average_processing_days(rows.into_iter()), None);
    }

    #[test]
    fn test_monthly_counts_filters_year_and_skips_zero() {
        let rows = vec![
            (dt(2025, 1, 10), TypeInscription::Master),
            (dt(2025, 1, 20), TypeInscription::Master),
            (dt(2025, 3, 5), TypeInscription::Reinsc),
            (dt(2024, 1, 5), TypeInscription::Master), // autre année
        ];

        let counts = monthly_counts(rows.into_iter(), 2025);
        assert_eq!(
            counts,
            vec![
                CompteurMensuel {
                    mois: 1,
                    kind: TypeInscription::Master,
                    total: 2
                },
                CompteurMensuel {
                    mois: 3,
                    kind: TypeInscription::Reinsc,
                    total: 1
                },
            ]
        );
    }

    #[test]
    fn test_weekday_counts_limits_to_current_week() {
        // 2025-04-09 est un mercredi ; la semaine va du 7 au 13 avril
        let today = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let dates = vec![
            dt(2025, 4, 7),  // lundi
            dt(2025, 4, 7),  // lundi
            dt(2025, 4, 11), // vendredi
            dt(2025, 4, 2),  // semaine précédente
            dt(2025, 4, 14), // semaine suivante
        ];

        let counts = weekday_counts(dates.into_iter(), today);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[0], CompteurJournalier { jour: "LUNDI".into(), total: 2 });
        assert_eq!(counts[4], CompteurJournalier { jour: "VENDREDI".into(), total: 1 });
        assert_eq!(counts[6], CompteurJournalier { jour: "DIMANCHE".into(), total: 0 });
    }

    #[test]
    fn test_satisfaction_rate() {
        assert_eq!(satisfaction_rate(0, 0), None);
        assert_eq!(satisfaction_rate(4, 3), Some(75.0));
    }
}
