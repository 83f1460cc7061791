use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nestcv::data::{load_dataset, make_moons};
use nestcv::experiment::{ExperimentConfig, TrialRunner};
use nestcv::search::{GridSearchCV, ParamGrid};
use nestcv::training::{CrossValidator, KernelType, SVMClassifier, SVMConfig};

fn rbf_svm() -> SVMConfig {
    SVMConfig {
        kernel: KernelType::RBF { gamma: 0.5 },
        ..SVMConfig::default()
    }
}

fn bench_svm_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("svm");
    group.sample_size(20);

    for n_samples in [100, 200, 400].iter() {
        let ds = make_moons(*n_samples, 0.3, 0).unwrap();

        group.bench_with_input(
            BenchmarkId::new("fit", n_samples),
            &ds,
            |b, ds| {
                b.iter(|| {
                    let mut model = SVMClassifier::new(rbf_svm());
                    model.fit(black_box(&ds.x), black_box(&ds.y)).unwrap();
                    model
                })
            },
        );
    }

    group.finish();
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);

    let ds = load_dataset("iris-binary").unwrap();
    let grid = ParamGrid::new()
        .add("C", [1.0, 10.0, 100.0])
        .add("gamma", [0.01, 0.1]);

    for jobs in [1usize, 4].iter() {
        let search = GridSearchCV::new(rbf_svm(), grid.clone(), CrossValidator::k_fold(4, 0))
            .with_refit(false)
            .with_n_jobs(Some(*jobs))
            .unwrap();

        group.bench_with_input(
            BenchmarkId::new("iris_6x4", jobs),
            &search,
            |b, search| {
                b.iter(|| search.fit(black_box(&ds.x), black_box(&ds.y)).unwrap())
            },
        );
    }

    group.finish();
}

fn bench_trial(c: &mut Criterion) {
    let mut group = c.benchmark_group("trial");
    group.sample_size(10);

    let ds = load_dataset("iris-binary").unwrap();
    let runner = TrialRunner::new(ExperimentConfig::default()).unwrap();

    group.bench_function("iris_nested_and_non_nested", |b| {
        b.iter(|| runner.run_trial(black_box(&ds), 0).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_svm_fit, bench_grid_search, bench_trial);
criterion_main!(benches);
