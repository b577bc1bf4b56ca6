use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mailcheck::{EmailValidator, Status};

fn bench_diagnose(validator: &EmailValidator<'_>, address: &str, expected: Status) {
    assert_eq!(validator.diagnose(address).status(), expected);
}

fn criterion_benchmark(c: &mut Criterion) {
    let validator = EmailValidator::new();
    c.bench_function("diagnose plain address", |b| {
        b.iter(|| {
            bench_diagnose(
                &validator,
                black_box("first.last@iana.org"),
                Status::Valid,
            )
        })
    });
    c.bench_function("diagnose quoted string with comment", |b| {
        b.iter(|| {
            bench_diagnose(
                &validator,
                black_box("(comment)\"first last\"@iana.org"),
                Status::CfwsComment,
            )
        })
    });
    c.bench_function("diagnose ipv6 literal", |b| {
        b.iter(|| {
            bench_diagnose(
                &validator,
                black_box("test@[IPv6:1111:2222:3333:4444:5555:6666:7777:8888]"),
                Status::Rfc5321AddressLiteral,
            )
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
