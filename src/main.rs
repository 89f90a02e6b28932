use std::{
    any::Any,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use eyre::{bail, eyre, Result, WrapErr};
use rand::rngs::OsRng;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

use credproof_core::{
    circuit::{compile, CircuitShape, NUM_ATTRIBUTES},
    config::CircuitConfig,
    credential::{CredentialRecord, PublicInputs},
    field::{encode_attribute, to_hex},
    gadgets::mimc::{DEFAULT_ROUNDS, DEFAULT_SEED},
    groth16::{prove, setup, verify, Proof, ProvingKey, VerifyingKey},
    serialization::{read_from_file, write_to_file},
    utils::errors::WitnessError,
    witness::Witness,
};

const DEMO_ATTRIBUTES: [&str; NUM_ATTRIBUTES] =
    ["Lukas", "Financial Technologies", "VU", "2025"];

/// Prove one attribute of a hashed credential without revealing the others.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[clap(flatten)]
    circuit: CircuitArgs,

    #[clap(flatten)]
    trace: TraceArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run compile, setup, prove and verify in memory
    Demo {
        #[clap(long, num_args = NUM_ATTRIBUTES, default_values = DEMO_ATTRIBUTES)]
        attributes: Vec<String>,

        /// Claimed value of the disclosed attribute; defaults to the true value
        #[clap(long)]
        expected: Option<String>,
    },
    /// Generate a proving/verifying key pair for the credential circuit
    Setup {
        #[clap(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Prove a claim about a credential
    Prove {
        #[clap(long)]
        pk: PathBuf,

        #[clap(long, num_args = NUM_ATTRIBUTES, required = true)]
        attributes: Vec<String>,

        /// Claimed value of the disclosed attribute; defaults to the true value
        #[clap(long)]
        expected: Option<String>,

        #[clap(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Check a proof; exits with status 1 if it is rejected
    Verify {
        #[clap(long)]
        vk: PathBuf,

        #[clap(long)]
        proof: PathBuf,

        #[clap(long)]
        public_inputs: PathBuf,

        /// Value the verifier expects the disclosed attribute to have, overriding the file
        #[clap(long)]
        expected: Option<String>,
    },
    /// Print the public hash of a credential
    Hash {
        #[clap(num_args = NUM_ATTRIBUTES, required = true)]
        attributes: Vec<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct CircuitArgs {
    /// Hash rounds per absorbed attribute
    #[clap(long, global = true, default_value_t = DEFAULT_ROUNDS)]
    rounds: usize,

    /// Label the hash round constants are derived from
    #[clap(long, global = true, default_value = DEFAULT_SEED)]
    seed_label: String,

    /// Seed for setup and proving randomness; OS entropy when absent
    #[clap(long, global = true)]
    rng_seed: Option<u64>,
}

impl CircuitArgs {
    fn shape(&self) -> CircuitShape {
        CircuitShape::with_config(
            CircuitConfig::default()
                .with_rounds(self.rounds)
                .with_seed(self.seed_label.clone()),
        )
    }

    fn rng(&self) -> Result<ChaCha20Rng> {
        match self.rng_seed {
            Some(seed) => {
                tracing::warn!("using a fixed RNG seed; keys and proofs are not secure");
                Ok(ChaCha20Rng::seed_from_u64(seed))
            }
            None => ChaCha20Rng::from_rng(OsRng).wrap_err("failed to seed RNG from the OS"),
        }
    }
}

#[derive(Args, Debug, Clone)]
struct TraceArgs {
    /// Log span close events with their durations
    #[clap(long, global = true)]
    timings: bool,

    /// Write a Chrome trace (trace-<timestamp>.json) viewable in https://ui.perfetto.dev/
    #[clap(long, global = true)]
    chrome: bool,
}

fn init_tracing(args: &TraceArgs) -> Vec<Box<dyn Any>> {
    let mut layers = Vec::new();

    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(log_filter)
        .boxed();
    layers.push(log_layer);

    let mut guards: Vec<Box<dyn Any>> = vec![];

    if args.timings {
        let collector_layer = tracing_subscriber::fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .compact()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed();
        layers.push(collector_layer);
    }
    if args.chrome {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
        layers.push(chrome_layer.boxed());
        guards.push(Box::new(guard));
    }

    tracing_subscriber::registry().with(layers).init();
    if args.chrome {
        tracing::info!("Running tracing-chrome. Files will be saved as trace-<some timestamp>.json and can be viewed in https://ui.perfetto.dev/");
    }
    guards
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guards = init_tracing(&cli.trace);

    match &cli.command {
        Commands::Demo {
            attributes,
            expected,
        } => demo(&cli.circuit, attributes, expected.as_deref()).map(verdict),
        Commands::Setup { out_dir } => run_setup(&cli.circuit, out_dir).map(|_| ExitCode::SUCCESS),
        Commands::Prove {
            pk,
            attributes,
            expected,
            out_dir,
        } => run_prove(&cli.circuit, pk, attributes, expected.as_deref(), out_dir)
            .map(|_| ExitCode::SUCCESS),
        Commands::Verify {
            vk,
            proof,
            public_inputs,
            expected,
        } => run_verify(vk, proof, public_inputs, expected.as_deref()).map(verdict),
        Commands::Hash { attributes } => {
            let record = load_record(&cli.circuit.shape(), attributes, None)?;
            println!("{}", to_hex(&record.public_inputs().hash));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_record(
    shape: &CircuitShape,
    attributes: &[String],
    expected: Option<&str>,
) -> Result<CredentialRecord> {
    let attributes: Vec<&str> = attributes.iter().map(String::as_str).collect();
    let record = CredentialRecord::from_attributes(&attributes, shape)
        .wrap_err("failed to encode credential attributes")?;
    match expected {
        Some(expected) => {
            let expected = encode_attribute(expected).wrap_err("failed to encode claim")?;
            Ok(record.with_expected(expected))
        }
        None => Ok(record),
    }
}

fn into_witness(
    record: CredentialRecord,
    cs: &credproof_core::ConstraintSystem,
) -> Result<Witness> {
    record.into_witness(cs).map_err(|e| match e {
        WitnessError::ConstraintUnsatisfied { index } => {
            eyre!("credential does not match the claim (constraint {index} fails)")
        }
        other => eyre!(other).wrap_err("failed to assign witness"),
    })
}

fn verdict(accepted: bool) -> ExitCode {
    if accepted {
        println!("proof accepted");
        ExitCode::SUCCESS
    } else {
        println!("proof rejected");
        ExitCode::FAILURE
    }
}

fn demo(args: &CircuitArgs, attributes: &[String], expected: Option<&str>) -> Result<bool> {
    let shape = args.shape();
    let mut rng = args.rng()?;

    let record = load_record(&shape, attributes, expected)?;
    let public = record.public_inputs();
    tracing::info!("public hash: {}", to_hex(&public.hash));

    let cs = compile(&shape).wrap_err("failed to compile circuit")?;
    tracing::info!("compiled {} constraints", cs.num_constraints());
    let (pk, vk) = setup(&cs, &mut rng).wrap_err("setup failed")?;

    let witness = into_witness(record, &cs)?;
    let proof = prove(&pk, witness, &mut rng).wrap_err("proving failed")?;

    Ok(verify(&vk, &public.to_vec(), &proof))
}

fn run_setup(args: &CircuitArgs, out_dir: &Path) -> Result<()> {
    let cs = compile(&args.shape()).wrap_err("failed to compile circuit")?;
    let (pk, vk) = setup(&cs, &mut args.rng()?).wrap_err("setup failed")?;

    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("failed to create {}", out_dir.display()))?;
    write_to_file("Proving key", out_dir.join("proving_key.bin"), &pk)?;
    write_to_file("Verifying key", out_dir.join("verifying_key.bin"), &vk)?;
    Ok(())
}

fn run_prove(
    args: &CircuitArgs,
    pk_path: &Path,
    attributes: &[String],
    expected: Option<&str>,
    out_dir: &Path,
) -> Result<()> {
    let shape = args.shape();
    let pk: ProvingKey = read_from_file(pk_path)
        .wrap_err_with(|| format!("failed to read proving key {}", pk_path.display()))?;
    let cs = pk.constraint_system();
    if cs.digest() != compile(&shape)?.digest() {
        bail!("proving key was generated for a different circuit configuration");
    }

    let record = load_record(&shape, attributes, expected)?;
    let public = record.public_inputs();
    let witness = into_witness(record, cs)?;
    let proof = prove(&pk, witness, &mut args.rng()?).wrap_err("proving failed")?;

    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("failed to create {}", out_dir.display()))?;
    write_to_file("Proof", out_dir.join("proof.bin"), &proof)?;
    write_to_file("Public inputs", out_dir.join("public_inputs.bin"), &public)?;
    Ok(())
}

fn run_verify(
    vk_path: &Path,
    proof_path: &Path,
    public_inputs_path: &Path,
    expected: Option<&str>,
) -> Result<bool> {
    let vk: VerifyingKey = read_from_file(vk_path)
        .wrap_err_with(|| format!("failed to read verifying key {}", vk_path.display()))?;
    let proof: Proof = read_from_file(proof_path)
        .wrap_err_with(|| format!("failed to read proof {}", proof_path.display()))?;
    let mut public: PublicInputs = read_from_file(public_inputs_path).wrap_err_with(|| {
        format!(
            "failed to read public inputs {}",
            public_inputs_path.display()
        )
    })?;
    if let Some(expected) = expected {
        public.expected = encode_attribute(expected).wrap_err("failed to encode claim")?;
    }

    Ok(verify(&vk, &public.to_vec(), &proof))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use credproof_core::gadgets::mimc::MimcParams;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn demo_accepts_true_claim_and_rejects_false_one() {
        let args = CircuitArgs {
            rounds: 4,
            seed_label: DEFAULT_SEED.to_string(),
            rng_seed: Some(1),
        };
        let attributes = DEMO_ATTRIBUTES.map(String::from);
        assert!(demo(&args, &attributes, None).unwrap());
        let err = demo(&args, &attributes, Some("Computer Science")).unwrap_err();
        assert!(err.to_string().contains("does not match the claim"));
    }

    #[test]
    fn demo_defaults() {
        let cli = Cli::try_parse_from(["credproof", "demo"]).unwrap();
        match cli.command {
            Commands::Demo {
                attributes,
                expected,
            } => {
                assert_eq!(attributes, DEMO_ATTRIBUTES.map(String::from).to_vec());
                assert!(expected.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.circuit.rounds, DEFAULT_ROUNDS);
        assert_eq!(cli.circuit.shape(), CircuitShape::default());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "credproof", "hash", "a", "b", "c", "d", "--rounds", "7", "--rng-seed", "3",
        ])
        .unwrap();
        assert_eq!(cli.circuit.rounds, 7);
        assert_eq!(cli.circuit.rng_seed, Some(3));
    }

    #[test]
    fn prove_needs_four_attributes() {
        assert!(Cli::try_parse_from([
            "credproof",
            "prove",
            "--pk",
            "pk.bin",
            "--attributes",
            "a",
            "b",
            "c",
        ])
        .is_err());
    }

    #[test]
    fn hash_matches_library() {
        let shape = CircuitArgs {
            rounds: 4,
            seed_label: DEFAULT_SEED.to_string(),
            rng_seed: None,
        }
        .shape();
        let attributes = DEMO_ATTRIBUTES.map(String::from);
        let record = load_record(&shape, &attributes, None).unwrap();
        let encoded: Vec<_> = DEMO_ATTRIBUTES
            .iter()
            .map(|a| encode_attribute(a).unwrap())
            .collect();
        assert_eq!(
            record.public_inputs().hash,
            MimcParams::new(&shape.config).hash(&encoded)
        );
    }

    #[test]
    fn files_round_trip_through_commands() {
        let dir = std::env::temp_dir().join(format!("credproof-cli-{}", std::process::id()));
        let args = CircuitArgs {
            rounds: 4,
            seed_label: DEFAULT_SEED.to_string(),
            rng_seed: Some(9),
        };
        let attributes = DEMO_ATTRIBUTES.map(String::from);

        run_setup(&args, &dir).unwrap();
        run_prove(&args, &dir.join("proving_key.bin"), &attributes, None, &dir).unwrap();
        assert!(run_verify(
            &dir.join("verifying_key.bin"),
            &dir.join("proof.bin"),
            &dir.join("public_inputs.bin"),
            None,
        )
        .unwrap());
        assert!(!run_verify(
            &dir.join("verifying_key.bin"),
            &dir.join("proof.bin"),
            &dir.join("public_inputs.bin"),
            Some("Computer Science"),
        )
        .unwrap());

        let mismatch = CircuitArgs {
            rounds: 5,
            ..args.clone()
        };
        assert!(
            run_prove(&mismatch, &dir.join("proving_key.bin"), &attributes, None, &dir).is_err()
        );

        let pk_path = dir.join("proving_key.bin");
        let mut bytes = fs::read(&pk_path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        fs::write(&pk_path, bytes).unwrap();
        let err = run_prove(&args, &pk_path, &attributes, None, &dir).unwrap_err();
        assert!(err.to_string().contains("failed to read proving key"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
