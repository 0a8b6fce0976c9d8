use candle_core::{DType, Device, Tensor};
use mindrag_embed::masked_mean_l2;

#[test]
fn padded_tokens_do_not_contribute() {
    let dev = Device::Cpu;
    // One sentence, a real token followed by padding.
    let hidden = Tensor::from_slice(&[1.0f32, 2.0, 2.0, 0.0, 40.0, 50.0, 60.0, 70.0], (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0], (1, 2), &dev).unwrap();
    let pooled: Vec<Vec<f32>> = masked_mean_l2(&hidden, &mask).unwrap().to_vec2().unwrap();
    // [1, 2, 2, 0] has norm 3.
    let expected = [1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 0.0];
    for (got, want) in pooled[0].iter().zip(expected) {
        assert!((got - want).abs() < 1e-5, "got={got} want={want}");
    }
}

#[test]
fn masked_mean_l2_batches_rows_independently() {
    let dev = Device::Cpu;
    let h = Tensor::from_slice(&[3.0f32, 0.0, 0.0, 4.0,   // row 0: both tokens kept
                                 0.0, 2.0, 9.0, 9.0],     // row 1: second token padded
                               (2, 2, 2), &dev).unwrap();
    let mask = Tensor::from_slice(&[1f32, 1.0, 1.0, 0.0], (2, 2), &dev).unwrap().to_dtype(DType::F32).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    // Row 0 mean [1.5, 2.0] has norm 2.5.
    assert!((out[0][0] - 0.6).abs() < 1e-5);
    assert!((out[0][1] - 0.8).abs() < 1e-5);
    // Row 1 keeps only [0, 2].
    assert!(out[1][0].abs() < 1e-5);
    assert!((out[1][1] - 1.0).abs() < 1e-5);
}

#[test]
fn masked_mean_l2_rejects_bad_rank() {
    let dev = Device::Cpu;
    let h = Tensor::zeros((2, 4), DType::F32, &dev).unwrap();
    let mask = Tensor::ones((2, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean_l2(&h, &mask).is_err());
}
