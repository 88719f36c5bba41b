pub mod bayes_net;
pub mod genotype;
pub mod infer;
pub mod reads;
pub mod site;
pub mod trio;
pub mod writer;

pub use bayes_net::{Cpt, Node, TrioBayesNet, TrioLikelihoods};
pub use genotype::{Allele, Genotype};
pub use infer::{map_infer, InferenceResult, TrioGenotypes};
pub use reads::ReadSummary;
pub use site::{stream_sites_into_channel, Site};
pub use trio::FamilyMember;
pub use writer::CallsWriter;
