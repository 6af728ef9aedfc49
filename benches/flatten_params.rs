//! Profiling benchmark for parameter flattening
//!
//! Run benchmark:    cargo bench --bench flatten_params
//! Smaller network:  cargo bench --bench flatten_params -- --small
//! Profile:          samply record cargo bench --bench flatten_params

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tensorview::{vectorize, Tensor};

/// Weight and bias tensors of a random multilayer perceptron
fn generate_layers(n_layers: usize, max_width: usize, rng: &mut StdRng) -> Vec<Tensor<f32>> {
    let mut widths = vec![rng.gen_range(8..=max_width)];
    for _ in 0..n_layers {
        widths.push(rng.gen_range(8..=max_width));
    }

    let mut tensors = Vec::with_capacity(2 * n_layers);
    for pair in widths.windows(2) {
        let (inputs, outputs) = (pair[0], pair[1]);
        let data: Vec<f32> = (0..inputs * outputs).map(|_| rng.gen_range(-1.0..1.0)).collect();
        tensors.push(Tensor::from_data(&data, &[outputs, inputs]).unwrap());
        tensors.push(Tensor::zeros(&[outputs]).unwrap());
    }
    tensors
}

fn time<R>(label: &str, iterations: usize, mut f: impl FnMut() -> R) -> R {
    let start = Instant::now();
    let mut result = f();
    for _ in 1..iterations {
        result = f();
    }
    let elapsed = start.elapsed().as_secs_f64();
    println!(
        "  {label:<28} {:>10.3} ms/iter ({iterations} iterations)",
        elapsed * 1e3 / iterations as f64
    );
    result
}

fn run_benchmark(n_layers: usize, max_width: usize, n_steps: usize) {
    let mut rng = StdRng::seed_from_u64(42);

    println!("Generating {n_layers} layers (width <= {max_width})...");
    let mut params = generate_layers(n_layers, max_width, &mut rng);
    let mut grads: Vec<Tensor<f32>> = params
        .iter()
        .map(|p| Tensor::full(p.shape(), 1e-3).unwrap())
        .collect();
    let total: usize = params.iter().map(Tensor::numel).sum();
    println!("  {} tensors, {} parameters", params.len(), total);

    println!("Flattening...");
    let flat_params = time("vectorize (copy)", 1, || {
        let mut refs: Vec<&mut Tensor<f32>> = params.iter_mut().collect();
        vectorize(&mut refs).unwrap()
    });
    let flat_grads = {
        let mut refs: Vec<&mut Tensor<f32>> = grads.iter_mut().collect();
        vectorize(&mut refs).unwrap()
    };
    time("vectorize (zero-copy)", 100, || {
        let mut refs: Vec<&mut Tensor<f32>> = params.iter_mut().collect();
        vectorize(&mut refs).unwrap()
    });

    println!("Updating...");
    time("flat sgd step", n_steps, || {
        flat_params.add_scaled(-0.01, &flat_grads).unwrap()
    });
    time("per-tensor sgd step", n_steps, || {
        for (p, g) in params.iter().zip(&grads) {
            p.add_scaled(-0.01, g).unwrap();
        }
    });

    println!("Traversing...");
    let checksum = time("transposed weight sums", n_steps, || {
        params
            .iter()
            .filter(|p| p.ndim() == 2)
            .map(|w| {
                let wt = w.transpose(0, 1).unwrap();
                wt.values().fold(0.0f32, |acc, v| acc + v)
            })
            .sum::<f32>()
    });
    println!("Result: {checksum}");

    let all_shared = params.iter().all(|p| p.shared_with(&flat_params));
    println!("All parameters view the flat vector: {all_shared}");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--small") {
        println!("Running small test (4 layers)...");
        run_benchmark(4, 64, 100);
    } else {
        run_benchmark(32, 512, 20);
    }
}
