use credproof_core::{
    circuit::{compile, CircuitShape},
    config::CircuitConfig,
    credential::CredentialRecord,
    gadgets::mimc::MimcParams,
    groth16::{prepare_verifying_key, prove, setup, verify_with_prepared},
};
use criterion::Criterion;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

const ATTRIBUTES: [&str; 4] = ["Lukas", "Financial Technologies", "VU", "2025"];

fn benchmark_native_hash(c: &mut Criterion) {
    let shape = CircuitShape::default();
    let params = MimcParams::new(&shape.config);
    let record = CredentialRecord::from_attributes(&ATTRIBUTES, &shape).unwrap();
    let inputs = [record.public_inputs().hash; 4];
    c.bench_function("mimc::hash 4 inputs", |b| {
        b.iter(|| criterion::black_box(params.hash(&inputs)))
    });
}

fn benchmark_pipeline(c: &mut Criterion, rounds: usize) {
    let shape = CircuitShape::with_config(CircuitConfig::default().with_rounds(rounds));
    let cs = compile(&shape).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    let num_constraints = cs.num_constraints();

    c.bench_function(&format!("compile [{rounds} rounds]"), |b| {
        b.iter(|| criterion::black_box(compile(&shape).unwrap()))
    });
    c.bench_function(&format!("setup [{num_constraints} constraints]"), |b| {
        b.iter(|| criterion::black_box(setup(&cs, &mut rng).unwrap()))
    });

    let (pk, vk) = setup(&cs, &mut rng).unwrap();
    c.bench_function(&format!("prove [{num_constraints} constraints]"), |b| {
        b.iter_with_setup(
            || {
                CredentialRecord::from_attributes(&ATTRIBUTES, &shape)
                    .unwrap()
                    .into_witness(&cs)
                    .unwrap()
            },
            |witness| criterion::black_box(prove(&pk, witness, &mut rng).unwrap()),
        )
    });

    let record = CredentialRecord::from_attributes(&ATTRIBUTES, &shape).unwrap();
    let public = record.public_inputs().to_vec();
    let proof = prove(&pk, record.into_witness(&cs).unwrap(), &mut rng).unwrap();
    let pvk = prepare_verifying_key(&vk);
    c.bench_function("verify", |b| {
        b.iter(|| assert!(verify_with_prepared(&pvk, &public, &proof)))
    });
}

fn main() {
    let mut criterion = Criterion::default()
        .configure_from_args()
        .sample_size(10)
        .warm_up_time(std::time::Duration::from_secs(2));

    benchmark_native_hash(&mut criterion);
    benchmark_pipeline(&mut criterion, 10);
    benchmark_pipeline(&mut criterion, 110);

    criterion.final_summary();
}
