use crate::denovo::genotype::Genotype;
use crate::denovo::reads::ReadSummary;
use crate::denovo::trio::FamilyMember;
use crate::utils::Result;
use arrayvec::ArrayVec;
use itertools::iproduct;
use std::collections::HashMap;

/// Tolerance for checking that a probability distribution sums to one.
pub const PROB_SUM_EPS: f64 = 1e-12;

/// Conditional probability table attached to one node of the trio network.
#[derive(Debug, Clone, PartialEq)]
pub enum Cpt {
    /// Distribution over the node's own genotype (father and mother).
    Prior([f64; Genotype::COUNT]),
    /// Child genotype distribution conditioned on both parents, indexed
    /// by [father][mother][child].
    Trio(Box<[[[f64; Genotype::COUNT]; Genotype::COUNT]; Genotype::COUNT]>),
}

/// One vertex of the trio network: a role, the roles it is conditioned on,
/// and the table quantifying that dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub member: FamilyMember,
    pub parents: ArrayVec<FamilyMember, 2>,
    pub cpt: Cpt,
}

impl Node {
    pub fn new(member: FamilyMember, cpt: Cpt) -> Node {
        let mut parents = ArrayVec::new();
        if member == FamilyMember::Child {
            parents.push(FamilyMember::Father);
            parents.push(FamilyMember::Mother);
        }
        Node {
            member,
            parents,
            cpt,
        }
    }
}

/// Per-member data log-likelihoods over the ten genotypes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrioLikelihoods {
    pub father: [f64; Genotype::COUNT],
    pub mother: [f64; Genotype::COUNT],
    pub child: [f64; Genotype::COUNT],
}

/// Fixed-topology Bayesian network over the trio: independent uniform
/// priors for the parents and a transmission table for the child derived
/// from the de novo mutation rate. Rates are validated and frozen at
/// construction.
#[derive(Debug, Clone)]
pub struct TrioBayesNet {
    nodes: HashMap<FamilyMember, Node>,
    seq_error_rate: f64,
    denovo_mutation_rate: f64,
}

impl TrioBayesNet {
    pub fn new(seq_error_rate: f64, denovo_mutation_rate: f64) -> Result<TrioBayesNet> {
        for (name, rate) in [
            ("Sequencing error rate", seq_error_rate),
            ("De novo mutation rate", denovo_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!(
                    "{} must be between 0.0 and 1.0, got: {}",
                    name, rate
                ));
            }
        }
        Ok(TrioBayesNet {
            nodes: HashMap::new(),
            seq_error_rate,
            denovo_mutation_rate,
        })
    }

    /// Assembles the network with the standard trio topology: father and
    /// mother nodes without parents, a child node conditioned on both.
    pub fn standard_trio(seq_error_rate: f64, denovo_mutation_rate: f64) -> Result<TrioBayesNet> {
        let mut net = TrioBayesNet::new(seq_error_rate, denovo_mutation_rate)?;
        for member in FamilyMember::ALL {
            let cpt = net.build_cpt(member)?;
            net.add_node(Node::new(member, cpt));
        }
        Ok(net)
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.member, node);
    }

    pub fn node(&self, member: FamilyMember) -> Option<&Node> {
        self.nodes.get(&member)
    }

    pub fn cpt(&self, member: FamilyMember) -> Option<&Cpt> {
        self.nodes.get(&member).map(|node| &node.cpt)
    }

    pub fn seq_error_rate(&self) -> f64 {
        self.seq_error_rate
    }

    pub fn denovo_mutation_rate(&self) -> f64 {
        self.denovo_mutation_rate
    }

    /// Builds the conditional probability table for one role.
    pub fn build_cpt(&self, member: FamilyMember) -> Result<Cpt> {
        match member {
            FamilyMember::Father | FamilyMember::Mother => Ok(Cpt::Prior(
                [1.0 / Genotype::COUNT as f64; Genotype::COUNT],
            )),
            FamilyMember::Child => self.build_child_cpt(),
        }
    }

    fn build_child_cpt(&self) -> Result<Cpt> {
        let mu = self.denovo_mutation_rate;
        let mut table = Box::new([[[0.0; Genotype::COUNT]; Genotype::COUNT]; Genotype::COUNT]);

        for (father, mother) in iproduct!(Genotype::ALL, Genotype::ALL) {
            let row = &mut table[father as usize][mother as usize];

            // First pass: mark the Mendelian-consistent child genotypes.
            // Every parent pair admits at least one, so valid_cases >= 1.
            let mut valid_cases = 0;
            for child in Genotype::ALL {
                if child.inherits_from(father, mother) {
                    row[child as usize] = 1.0;
                    valid_cases += 1;
                }
            }

            // Second pass: spread a total mass of mu uniformly over the
            // inconsistent genotypes and take the same mass back from the
            // consistent ones.
            let spread_cases = Genotype::COUNT - valid_cases;
            for child in Genotype::ALL {
                let entry: &mut f64 = &mut row[child as usize];
                *entry = if entry.abs() <= PROB_SUM_EPS {
                    mu
                } else {
                    1.0 / valid_cases as f64 - mu * spread_cases as f64 / valid_cases as f64
                };
            }

            let total: f64 = row.iter().sum();
            if (total - 1.0).abs() > PROB_SUM_EPS {
                return Err(format!(
                    "Child CPT for parent genotypes {}/{} sums to {} instead of 1.0",
                    father, mother, total
                ));
            }
        }
        Ok(Cpt::Trio(table))
    }

    /// Log-probability of observing a single base call given a genotype.
    ///
    /// A sequencing error turns the true base into any of the three other
    /// bases with equal probability; a heterozygous genotype emits each of
    /// its alleles half the time.
    pub fn base_log_likelihood(&self, genotype: Genotype, base: char) -> f64 {
        let e = self.seq_error_rate;
        if genotype.is_homozygous() {
            if genotype.contains(base) {
                (1.0 - e).ln()
            } else {
                e.ln() - 3.0f64.ln()
            }
        } else if genotype.contains(base) {
            (1.0 - 2.0 * e / 3.0).ln() - 2.0f64.ln()
        } else {
            e.ln() - 3.0f64.ln()
        }
    }

    /// Data log-likelihood of a read summary under every genotype, summing
    /// the per-base model over all observed calls.
    pub fn genotype_log_likelihoods(&self, summary: &ReadSummary) -> [f64; Genotype::COUNT] {
        let mut likelihoods = [0.0; Genotype::COUNT];
        for genotype in Genotype::ALL {
            likelihoods[genotype as usize] = summary
                .counts()
                .map(|(base, count)| count as f64 * self.base_log_likelihood(genotype, base))
                .sum();
        }
        likelihoods
    }

    /// Per-member genotype log-likelihoods for one site. A member without
    /// a read summary is a hard error rather than a partial result.
    pub fn individual_log_likelihoods(
        &self,
        summaries: &HashMap<FamilyMember, ReadSummary>,
    ) -> Result<TrioLikelihoods> {
        let member_likelihoods = |member: FamilyMember| {
            summaries
                .get(&member)
                .map(|summary| self.genotype_log_likelihoods(summary))
                .ok_or_else(|| format!("Missing read summary for {}", member))
        };
        Ok(TrioLikelihoods {
            father: member_likelihoods(FamilyMember::Father)?,
            mother: member_likelihoods(FamilyMember::Mother)?,
            child: member_likelihoods(FamilyMember::Child)?,
        })
    }
}
