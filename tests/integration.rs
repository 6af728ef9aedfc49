//! Integration tests for tensorview.
//!
//! These tests follow the way layer code uses the engine: independent
//! parameter and gradient tensors are flattened once, then updated through
//! the flat views step after step.

use tensorview::{concatenate, vectorize, Standard, SubRange, Tensor};

/// A dense layer's parameters and gradients, allocated independently.
struct Dense {
    weight: Tensor<f32>,
    bias: Tensor<f32>,
    d_weight: Tensor<f32>,
    d_bias: Tensor<f32>,
}

impl Dense {
    fn new(inputs: usize, outputs: usize, init: f32) -> Self {
        Self {
            weight: Tensor::full(&[outputs, inputs], init).unwrap(),
            bias: Tensor::zeros(&[outputs]).unwrap(),
            d_weight: Tensor::zeros(&[outputs, inputs]).unwrap(),
            d_bias: Tensor::zeros(&[outputs]).unwrap(),
        }
    }

    /// y = W x + b for a single column input `x: [inputs, 1]`.
    fn forward(&self, x: &Tensor<f32>) -> Tensor<f32> {
        let y = self.weight.gemm::<Standard<f32>>(x).unwrap();
        let b = self.bias.view(&[self.bias.numel(), 1]).unwrap();
        y.add_assign(&b).unwrap();
        y
    }
}

#[test]
fn test_flattened_parameters_drive_layer_updates() {
    let mut l1 = Dense::new(3, 2, 0.5);
    let mut l2 = Dense::new(2, 1, 1.0);

    let params = vectorize(&mut [&mut l1.weight, &mut l1.bias, &mut l2.weight, &mut l2.bias])
        .unwrap();
    let grads = vectorize(&mut [
        &mut l1.d_weight,
        &mut l1.d_bias,
        &mut l2.d_weight,
        &mut l2.d_bias,
    ])
    .unwrap();
    assert_eq!(params.numel(), 6 + 2 + 2 + 1);
    assert_eq!(grads.numel(), params.numel());

    let x = Tensor::<f32>::from_data(&[1.0, 2.0, 3.0], &[3, 1]).unwrap();
    let before = l2.forward(&l1.forward(&x)).to_vec();
    assert_eq!(before, vec![6.0]);

    // Layers write their gradients, the optimizer updates the flat vector
    l1.d_bias.fill(1.0).unwrap();
    l2.d_bias.fill(2.0).unwrap();
    for _ in 0..3 {
        params.add_scaled(-0.5, &grads).unwrap();
    }

    assert_eq!(l1.bias.to_vec(), vec![-1.5, -1.5]);
    assert_eq!(l2.bias.to_vec(), vec![-3.0]);
    assert_eq!(l1.weight.to_vec(), vec![0.5; 6]);

    let after = l2.forward(&l1.forward(&x)).to_vec();
    // Hidden units: 3.0 - 1.5 each, output: 1.5 + 1.5 - 3.0
    assert_eq!(after, vec![0.0]);
}

#[test]
fn test_revectorizing_is_zero_copy() {
    let mut a = Tensor::<f64>::zeros(&[4, 4]).unwrap();
    let mut b = Tensor::<f64>::zeros(&[4]).unwrap();

    let first = vectorize(&mut [&mut a, &mut b]).unwrap();
    let second = vectorize(&mut [&mut a, &mut b]).unwrap();
    assert_eq!(first.ptr(), second.ptr());
    assert!(first.shared_with(&second));
    assert_eq!(a.share_count(), 4);
}

#[test]
fn test_shrinking_resize_keeps_flat_sharing() {
    let mut a = Tensor::<f32>::from_slice(&[1.0, 2.0, 3.0, 4.0]);
    let mut b = Tensor::<f32>::from_slice(&[5.0, 6.0]);
    let flat = vectorize(&mut [&mut a, &mut b]).unwrap();

    // Shared and not growing: only the view changes
    a.resize(&[2, 2]).unwrap();
    assert!(a.shared_with(&flat));
    a.set(&[1, 1], 40.0).unwrap();
    assert_eq!(flat.get(&[3]).unwrap(), 40.0);

    // Shared and growing: detaches, the flat vector is untouched
    b.resize(&[3]).unwrap();
    assert!(!b.shared_with(&flat));
    b.set(&[0], -1.0).unwrap();
    assert_eq!(flat.get(&[4]).unwrap(), 5.0);
    assert_eq!(b.to_vec(), vec![-1.0, 6.0, 0.0]);
}

#[test]
fn test_recurrent_state_concatenation() {
    // Hidden and cell state of a recurrent layer joined along the feature axis
    let mut hidden = Tensor::<f32>::from_data(&[1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    let mut cell = Tensor::<f32>::from_data(&[5.0, 6.0], &[2, 1]).unwrap();
    let state = concatenate(&mut [&mut hidden, &mut cell], 1).unwrap();

    assert_eq!(state.shape(), &[2, 3]);
    assert_eq!(state.to_vec(), vec![1.0, 2.0, 5.0, 3.0, 4.0, 6.0]);
    assert!(!hidden.is_contiguous());

    // Resetting the state clears both parts
    state.fill(0.0).unwrap();
    assert_eq!(hidden.to_vec(), vec![0.0; 4]);
    assert_eq!(cell.to_vec(), vec![0.0; 2]);

    // Writing a part shows up in the joined state
    cell.set(&[1, 0], 9.0).unwrap();
    assert_eq!(state.get(&[1, 2]).unwrap(), 9.0);
}

#[test]
fn test_batch_slicing_for_minibatches() {
    let data: Vec<f64> = (0..24).map(f64::from).collect();
    let batch = Tensor::from_data(&data, &[6, 4]).unwrap();

    let mut seen = Vec::new();
    for start in (0..6).step_by(2) {
        let mb = batch.narrow(0, start, 2).unwrap();
        assert!(mb.is_contiguous());
        assert!(mb.shared_with(&batch));
        seen.extend(mb.to_vec());
    }
    assert_eq!(seen, data);

    let sample = batch
        .sub(&[SubRange::Index(5), SubRange::Range { start: 1, len: 3 }])
        .unwrap();
    assert_eq!(sample.to_vec(), vec![21.0, 22.0, 23.0]);
}

#[test]
fn test_select_reassembles_original() {
    let data: Vec<i32> = (0..12).collect();
    let t = Tensor::from_data(&data, &[3, 4]).unwrap();

    for dim in 0..2 {
        let rebuilt = Tensor::<i32>::zeros(t.shape()).unwrap();
        for i in 0..t.size(dim).unwrap() {
            rebuilt.select(dim, i).unwrap().copy_from(&t.select(dim, i).unwrap()).unwrap();
        }
        assert_eq!(rebuilt.to_vec(), data);
    }
}

#[test]
fn test_update_closures_read_and_write_sibling_views() {
    let mut layer = Dense::new(2, 2, 1.0);
    layer.bias.assign_slice(&[0.5, -0.5]).unwrap();
    let params = vectorize(&mut [&mut layer.weight, &mut layer.bias]).unwrap();
    let grads = vectorize(&mut [&mut layer.d_weight, &mut layer.d_bias]).unwrap();

    // Bias gradient accumulated while walking the weight rows
    let mut k = 0;
    layer.weight.for_each(|w| {
        let row = k / 2;
        let g = layer.d_bias.get(&[row]).unwrap();
        layer.d_bias.set(&[row], g + w).unwrap();
        k += 1;
    });

    // Weight update that reads a bias entry of the same flat vector
    layer
        .weight
        .apply(|w| w - 0.5 * layer.bias.get(&[0]).unwrap())
        .unwrap();

    assert_eq!(params.to_vec(), vec![0.75, 0.75, 0.75, 0.75, 0.5, -0.5]);
    assert_eq!(grads.to_vec(), vec![0.0, 0.0, 0.0, 0.0, 2.0, 2.0]);
}
