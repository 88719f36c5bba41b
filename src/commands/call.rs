use crate::cli::CallArgs;
use crate::denovo::{
    map_infer, stream_sites_into_channel, CallsWriter, InferenceResult, Site, TrioBayesNet,
};
use crate::utils::{create_writer, Result};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{sync::Arc, thread};

const CHANNEL_BUFFER_SIZE: usize = 2048;

pub fn dncall(args: CallArgs) -> Result<()> {
    let network = Arc::new(TrioBayesNet::standard_trio(
        args.seq_err_rate,
        args.denovo_mut_rate,
    )?);
    log::debug!(
        "Constructed trio network (seq err rate = {}, de novo rate = {})",
        network.seq_error_rate(),
        network.denovo_mutation_rate()
    );

    let calls_writer = create_writer(&args.output_prefix, "calls.tsv", CallsWriter::new)?;

    let (sender_site, receiver_site) = bounded(CHANNEL_BUFFER_SIZE);
    let sites_path = args.sites_path.clone();
    let site_stream_thread = thread::spawn(move || {
        stream_sites_into_channel(&sites_path, sender_site);
    });

    let (sender_result, receiver_result) = bounded(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || {
        let mut calls_writer = calls_writer;
        for (site, result) in &receiver_result {
            calls_writer.write(&site, &result);
        }
        calls_writer.finish()
    });

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .thread_name(|i| format!("dncall-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))?;

    pool.install(|| {
        receiver_site
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, site_result| match site_result {
                Ok(site) => process_site(site, &network, s),
                Err(err) => log::error!("Site processing: {}", err),
            });
    });

    // Clean-up
    drop(sender_result);
    writer_thread.join().expect("Writer thread panicked")?;
    site_stream_thread
        .join()
        .expect("Site stream thread panicked");
    log::trace!("Writer and site stream threads finished");

    Ok(())
}

fn process_site(
    site: Site,
    network: &TrioBayesNet,
    sender_result: &Sender<(Site, InferenceResult)>,
) {
    let outcome = network
        .individual_log_likelihoods(&site.summaries)
        .and_then(|likelihoods| map_infer(network, &likelihoods));
    match outcome {
        Ok(result) => {
            if result.is_denovo {
                log::info!(
                    "De novo candidate at {}:{} [{}] (log posterior {:.3})",
                    site.chrom,
                    site.pos,
                    result.trio,
                    result.log_posterior
                );
            }
            if let Err(e) = sender_result.send((site, result)) {
                log::error!("Failed to send site result to writer thread: {}", e);
            }
        }
        Err(err) => log::error!("Error analyzing site {}:{}: {}", site.chrom, site.pos, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CallArgs;
    use std::collections::HashSet;

    fn run_call(sites: &str, dir: &std::path::Path) -> Vec<String> {
        let sites_path = dir.join("sites.tsv");
        std::fs::write(&sites_path, sites).unwrap();
        let output_prefix = dir.join("out").to_str().unwrap().to_string();

        let args = CallArgs {
            sites_path,
            output_prefix: output_prefix.clone(),
            num_threads: 1,
            seq_err_rate: 1e-2,
            denovo_mut_rate: 1e-8,
        };
        dncall(args).unwrap();

        let contents = std::fs::read_to_string(format!("{}.calls.tsv", output_prefix)).unwrap();
        contents.lines().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_call_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let lines = run_call(
            "# sites\n\
             chr1 816785 C:60 C:60 C:60\n\
             chr1 70041751 C:58,T:2 C:51,T:2 C:28,T:8\n",
            dir.path(),
        );

        assert_eq!(
            lines[0],
            "chrom\tpos\tfather_gt\tmother_gt\tchild_gt\tdenovo"
        );
        let rows: HashSet<&str> = lines[1..].iter().map(|row| row.as_str()).collect();
        assert_eq!(
            rows,
            HashSet::from([
                "chr1\t816785\tCC\tCC\tCC\tfalse",
                "chr1\t70041751\tCC\tCC\tCT\ttrue",
            ])
        );
    }

    #[test]
    fn test_call_skips_sites_with_missing_members() {
        let dir = tempfile::tempdir().unwrap();
        let lines = run_call(
            "chr1 100 C:60 C:60 .\n\
             chr2 200 A:30 A:30 A:30\n",
            dir.path(),
        );

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "chr2\t200\tAA\tAA\tAA\tfalse");
    }
}
