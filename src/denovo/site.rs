use crate::denovo::reads::ReadSummary;
use crate::denovo::trio::FamilyMember;
use crate::utils::{open_sites_reader, Result};
use crossbeam_channel::Sender;
use std::{collections::HashMap, io::BufRead, path::Path};

/// Field value marking a member with no read data at a site.
const MISSING_FIELD: &str = ".";

/// One genomic site with the read evidence gathered for each trio member.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub chrom: String,
    pub pos: u32,
    pub summaries: HashMap<FamilyMember, ReadSummary>,
}

impl Site {
    /// Parses one sites-file line of the form
    /// `chrom pos father_counts mother_counts child_counts`, where each
    /// counts field is either `BASE:COUNT` pairs joined by commas or `.`
    /// for a member without data.
    pub fn new(line: &str) -> Result<Self> {
        const EXPECTED_FIELD_COUNT: usize = 5;
        let split_line: Vec<&str> = line.split_whitespace().collect();
        if split_line.len() != EXPECTED_FIELD_COUNT {
            return Err(format!(
                "Expected {} fields in the format 'chrom pos father mother child', found {}: {}",
                EXPECTED_FIELD_COUNT,
                split_line.len(),
                line
            ));
        }

        let (chrom, pos, father, mother, child) = match &split_line[..] {
            [chrom, pos, father, mother, child] => (*chrom, *pos, *father, *mother, *child),
            _ => unreachable!(),
        };

        let pos: u32 = pos
            .parse()
            .map_err(|_| format!("Invalid position '{}': {}", pos, line))?;

        let mut summaries = HashMap::new();
        for (member, field) in [
            (FamilyMember::Father, father),
            (FamilyMember::Mother, mother),
            (FamilyMember::Child, child),
        ] {
            if field != MISSING_FIELD {
                let summary = ReadSummary::from_field(field)
                    .map_err(|e| format!("Bad counts for {}: {}", member, e))?;
                summaries.insert(member, summary);
            }
        }

        Ok(Site {
            chrom: chrom.to_string(),
            pos,
            summaries,
        })
    }
}

/// Reads the sites file line by line and feeds parsed sites into the
/// channel. Parse failures are reported per line and skipped; an I/O
/// failure ends the stream.
pub fn stream_sites_into_channel(sites_path: &Path, sender: Sender<Result<Site>>) {
    let reader = match open_sites_reader(sites_path) {
        Ok(reader) => reader,
        Err(e) => {
            sender
                .send(Err(e))
                .expect("Failed to send error through channel");
            return;
        }
    };

    for (line_number, result_line) in reader.lines().enumerate() {
        let line = match result_line {
            Ok(line) => line,
            Err(err) => {
                let error = format!("Error at sites line {}: {}", line_number + 1, err);
                sender
                    .send(Err(error))
                    .expect("Failed to send error through channel");
                return;
            }
        };

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let site = Site::new(&line)
            .map_err(|e| format!("Error at sites line {}: {}", line_number + 1, e));
        sender
            .send(site)
            .expect("Failed to send site through channel");
    }
}
