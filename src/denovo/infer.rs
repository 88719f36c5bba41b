use crate::denovo::bayes_net::{Cpt, TrioBayesNet, TrioLikelihoods};
use crate::denovo::genotype::Genotype;
use crate::denovo::trio::FamilyMember;
use crate::utils::Result;
use itertools::iproduct;
use std::fmt;

/// Joint genotype assignment for the trio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrioGenotypes {
    pub father: Genotype,
    pub mother: Genotype,
    pub child: Genotype,
}

impl fmt::Display for TrioGenotypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.father, self.mother, self.child)
    }
}

/// Outcome of MAP inference at one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceResult {
    pub trio: TrioGenotypes,
    pub log_posterior: f64,
    pub is_denovo: bool,
}

/// Exhaustive MAP search over the 10x10x10 joint genotype space.
///
/// Each candidate is scored by the trio data log-likelihoods plus the log
/// network priors. Ties keep the earliest-enumerated candidate (father
/// outermost, child innermost, in `Genotype::ALL` order), which makes the
/// search deterministic.
pub fn map_infer(net: &TrioBayesNet, likelihoods: &TrioLikelihoods) -> Result<InferenceResult> {
    let father_prior = match net.cpt(FamilyMember::Father) {
        Some(Cpt::Prior(table)) => table,
        _ => return Err("Trio network is missing the father prior table".to_string()),
    };
    let mother_prior = match net.cpt(FamilyMember::Mother) {
        Some(Cpt::Prior(table)) => table,
        _ => return Err("Trio network is missing the mother prior table".to_string()),
    };
    let transmission = match net.cpt(FamilyMember::Child) {
        Some(Cpt::Trio(table)) => table,
        _ => return Err("Trio network is missing the child transmission table".to_string()),
    };

    let joint_score = |father: Genotype, mother: Genotype, child: Genotype| {
        likelihoods.father[father as usize]
            + likelihoods.mother[mother as usize]
            + likelihoods.child[child as usize]
            + father_prior[father as usize].ln()
            + mother_prior[mother as usize].ln()
            + transmission[father as usize][mother as usize][child as usize].ln()
    };

    let mut best = TrioGenotypes {
        father: Genotype::AA,
        mother: Genotype::AA,
        child: Genotype::AA,
    };
    let mut best_score = joint_score(best.father, best.mother, best.child);
    for (father, mother, child) in iproduct!(Genotype::ALL, Genotype::ALL, Genotype::ALL) {
        let score = joint_score(father, mother, child);
        if score > best_score {
            best_score = score;
            best = TrioGenotypes {
                father,
                mother,
                child,
            };
        }
    }

    Ok(InferenceResult {
        trio: best,
        log_posterior: best_score,
        is_denovo: !best.child.inherits_from(best.father, best.mother),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denovo::reads::ReadSummary;
    use std::collections::{BTreeMap, HashMap};

    fn summaries_from(
        father: &[(char, u32)],
        mother: &[(char, u32)],
        child: &[(char, u32)],
    ) -> HashMap<FamilyMember, ReadSummary> {
        let tally = |counts: &[(char, u32)]| {
            ReadSummary::new(counts.iter().copied().collect::<BTreeMap<char, u32>>())
        };
        HashMap::from([
            (FamilyMember::Father, tally(father)),
            (FamilyMember::Mother, tally(mother)),
            (FamilyMember::Child, tally(child)),
        ])
    }

    fn infer(
        net: &TrioBayesNet,
        summaries: &HashMap<FamilyMember, ReadSummary>,
    ) -> InferenceResult {
        let likelihoods = net.individual_log_likelihoods(summaries).unwrap();
        map_infer(net, &likelihoods).unwrap()
    }

    #[test]
    fn test_concordant_homozygous_trio() {
        let net = TrioBayesNet::standard_trio(1e-2, 1e-8).unwrap();
        let summaries = summaries_from(&[('C', 60)], &[('C', 60)], &[('C', 60)]);
        let result = infer(&net, &summaries);
        assert_eq!(
            result.trio,
            TrioGenotypes {
                father: Genotype::CC,
                mother: Genotype::CC,
                child: Genotype::CC
            }
        );
        assert!(!result.is_denovo);
    }

    #[test]
    fn test_concordant_homozygous_trio_alt_base() {
        let net = TrioBayesNet::standard_trio(1e-2, 1e-8).unwrap();
        let summaries = summaries_from(&[('A', 60)], &[('A', 60)], &[('A', 60)]);
        let result = infer(&net, &summaries);
        assert_eq!(
            result.trio,
            TrioGenotypes {
                father: Genotype::AA,
                mother: Genotype::AA,
                child: Genotype::AA
            }
        );
        assert!(!result.is_denovo);
    }

    #[test]
    fn test_denovo_child_against_homozygous_parents() {
        let net = TrioBayesNet::standard_trio(1e-2, 1e-8).unwrap();
        let summaries = summaries_from(
            &[('C', 58), ('T', 2)],
            &[('C', 51), ('T', 2)],
            &[('C', 28), ('T', 8)],
        );
        let result = infer(&net, &summaries);
        assert_eq!(
            result.trio,
            TrioGenotypes {
                father: Genotype::CC,
                mother: Genotype::CC,
                child: Genotype::CT
            }
        );
        assert!(!result
            .trio
            .child
            .inherits_from(result.trio.father, result.trio.mother));
        assert!(result.is_denovo);
    }

    #[test]
    fn test_inference_is_idempotent() {
        let net = TrioBayesNet::standard_trio(1e-2, 1e-8).unwrap();
        let summaries = summaries_from(
            &[('C', 58), ('T', 2)],
            &[('C', 51), ('T', 2)],
            &[('C', 28), ('T', 8)],
        );
        let first = infer(&net, &summaries);
        let second = infer(&net, &summaries);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tie_break_keeps_earliest_candidate() {
        // With no read evidence at all, every maximal-prior candidate ties
        // and the first-enumerated one must win.
        let net = TrioBayesNet::standard_trio(1e-2, 1e-8).unwrap();
        let summaries = summaries_from(&[], &[], &[]);
        let result = infer(&net, &summaries);
        assert_eq!(
            result.trio,
            TrioGenotypes {
                father: Genotype::AA,
                mother: Genotype::AA,
                child: Genotype::AA
            }
        );
        assert!(!result.is_denovo);
    }

    #[test]
    fn test_denovo_call_at_high_depth_with_noise_and_gaps() {
        let net = TrioBayesNet::standard_trio(1e-2, 1e-8).unwrap();
        let summaries = summaries_from(
            &[('C', 225), ('T', 24), ('A', 2), ('-', 5)],
            &[('C', 223), ('T', 22), ('G', 3), ('A', 6), ('-', 2)],
            &[('C', 218), ('T', 34), ('G', 1), ('A', 2), ('-', 1)],
        );
        let result = infer(&net, &summaries);
        assert_eq!(
            result.trio,
            TrioGenotypes {
                father: Genotype::CC,
                mother: Genotype::CC,
                child: Genotype::CT
            }
        );
        assert!(result.is_denovo);
    }

    #[test]
    fn test_incomplete_network_is_an_error() {
        let net = TrioBayesNet::new(1e-2, 1e-8).unwrap();
        let likelihoods = TrioLikelihoods {
            father: [0.0; Genotype::COUNT],
            mother: [0.0; Genotype::COUNT],
            child: [0.0; Genotype::COUNT],
        };
        assert!(map_infer(&net, &likelihoods).is_err());
    }
}
