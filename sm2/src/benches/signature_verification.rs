use commonware_sm2::{CurveParams, PrivateKey, Signer, Sm3, Verifier};
use criterion::{criterion_group, BatchSize, Criterion};
use rand::{thread_rng, Rng};
use std::hint::black_box;

fn benchmark_signature_verification(c: &mut Criterion) {
    let identifier = b"identifier";
    let mut msg = [0u8; 32];
    thread_rng().fill(&mut msg);
    let curve = CurveParams::load();
    let verifier = Verifier::new(curve);
    c.bench_function(
        &format!(
            "{}/id_len={} msg_len={}",
            module_path!(),
            identifier.len(),
            msg.len()
        ),
        |b| {
            b.iter_batched(
                || {
                    let private_key = PrivateKey::from_rng(&mut thread_rng());
                    let signature = Signer::new(curve)
                        .sign::<Sm3, _>(&mut thread_rng(), &private_key, Some(identifier), &msg)
                        .unwrap();
                    (private_key, signature)
                },
                |(private_key, signature)| {
                    black_box(verifier.verify::<Sm3>(
                        private_key.public_key(),
                        Some(identifier),
                        &msg,
                        &signature,
                    ));
                },
                BatchSize::SmallInput,
            );
        },
    );
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_signature_verification
}
