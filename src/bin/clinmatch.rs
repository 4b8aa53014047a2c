// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! clinmatch CLI
//!
//! Command-line interface for building the ClinVar reference index and
//! matching individual genotype files against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use clinmatch::annotate::{GenNotesClient, MyVariantClient};
use clinmatch::cache::PersistentCache;
use clinmatch::chromosome::ChromosomeMap;
use clinmatch::config::ClinMatchConfig;
use clinmatch::genome::GenomeBuild;
use clinmatch::index::IndexState;
use clinmatch::matcher::Matcher;
use clinmatch::openhumans::{write_cohort_metadata, OpenHumansClient};
use clinmatch::pipeline::{prepare_index, process_directory, process_individual};
use clinmatch::Result;

#[derive(Parser)]
#[command(name = "clinmatch")]
#[command(author, version, about = "Match personal genotype VCFs against ClinVar")]
#[command(
    long_about = "Build a ClinVar reference index and match 23andMe-derived VCFs against it.

Examples:
  clinmatch fetch --output genotype_data
  clinmatch build-index --clinvar clinvar.vcf.gz --index clinvar.db
  clinmatch match --index clinvar.db --input genotype_data --output matched
  clinmatch run"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download publicly shared 23andMe VCFs from OpenHumans
    Fetch {
        /// Directory to download genotype files into
        #[arg(short, long, default_value = "genotype_data")]
        output: PathBuf,

        /// Listing URL to page through
        #[arg(long)]
        listing_url: Option<String>,

        /// Where to write the cohort metadata JSON
        #[arg(long, default_value = "openhumans_23andme_metadata.json")]
        metadata: PathBuf,
    },

    /// Build the reference index from a ClinVar VCF dump
    BuildIndex {
        /// Compressed ClinVar VCF dump
        #[arg(short, long)]
        clinvar: PathBuf,

        /// Index database to create
        #[arg(short, long, default_value = "clinvar.db")]
        index: PathBuf,
    },

    /// Match genotype files against an existing index
    Match {
        /// Index database built with build-index
        #[arg(short, long, default_value = "clinvar.db")]
        index: PathBuf,

        /// A genotype file, or a directory of them
        #[arg(long)]
        input: PathBuf,

        /// Directory for the per-individual JSON output
        #[arg(short, long, default_value = "matched")]
        output: PathBuf,

        /// Genome build of the inputs (GRCh37 or GRCh38)
        #[arg(long, default_value = "GRCh37")]
        build: String,

        /// Persistent cache for nomenclature-service responses
        #[arg(long, default_value = "myvariant_cache.db")]
        cache: PathBuf,

        /// Skip external annotation lookups entirely
        #[arg(long)]
        offline: bool,
    },

    /// Run the full pipeline (fetch, index, match) from configuration
    Run {
        /// Configuration file (defaults to .clinmatch.toml lookup)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch {
            output,
            listing_url,
            metadata,
        } => {
            let client = match listing_url {
                Some(url) => OpenHumansClient::with_listing_url(url),
                None => OpenHumansClient::new(),
            };

            let mut sources = client.list_vcf_sources()?;
            tracing::info!(count = sources.len(), "genotype sources listed");

            for source in &mut sources {
                client.download(source, &output)?;
            }
            write_cohort_metadata(&metadata, &sources)?;
            tracing::info!(metadata = %metadata.display(), "cohort metadata written");
            Ok(())
        }

        Commands::BuildIndex { clinvar, index } => {
            let chromosomes = ChromosomeMap::human();
            let report = prepare_index(&clinvar, &index, &chromosomes)?;
            match report.state {
                IndexState::Created => {
                    tracing::info!(records = report.stored, "index built")
                }
                IndexState::OpenedExisting => tracing::warn!(
                    "index already exists; delete it to rebuild from the dump"
                ),
            }
            Ok(())
        }

        Commands::Match {
            index,
            input,
            output,
            build,
            cache,
            offline,
        } => {
            let chromosomes = ChromosomeMap::human();
            let index = clinmatch::ReferenceVariantIndex::open(&index)?;
            let build = GenomeBuild::from_name(&build);

            let mut matcher = Matcher::new(&index, &chromosomes, build);
            if !offline {
                matcher = matcher
                    .with_coordinate_service(GenNotesClient::new())
                    .with_nomenclature_service(MyVariantClient::new(PersistentCache::open(
                        &cache,
                    )?));
            }

            if input.is_dir() {
                process_directory(&input, &matcher, &output)?;
            } else {
                process_individual(&input, &matcher, &output)?;
            }
            Ok(())
        }

        Commands::Run { config } => {
            let config = match config {
                Some(path) => ClinMatchConfig::load_from_path(&path)?,
                None => ClinMatchConfig::load(),
            };

            let client = OpenHumansClient::with_listing_url(config.listing_url.clone());
            let mut sources = client.list_vcf_sources()?;
            tracing::info!(count = sources.len(), "genotype sources listed");
            for source in &mut sources {
                client.download(source, &config.genotype_dir)?;
            }

            let chromosomes = ChromosomeMap::human();
            let report = prepare_index(&config.clinvar_dump, &config.index_path, &chromosomes)?;

            let cache = PersistentCache::open(&config.cache_path)?;
            let matcher = Matcher::new(
                &report.index,
                &chromosomes,
                GenomeBuild::from_name(&config.build),
            )
            .with_coordinate_service(GenNotesClient::with_base_url(config.gennotes_url.clone()))
            .with_nomenclature_service(MyVariantClient::with_base_url(
                config.myvariant_url.clone(),
                cache,
            ));

            process_directory(&config.genotype_dir, &matcher, &config.output_dir)?;

            std::fs::create_dir_all(&config.output_dir)?;
            let metadata_path = config.output_dir.join("openhumans_23andme_metadata.json");
            write_cohort_metadata(&metadata_path, &sources)?;
            Ok(())
        }
    }
}
