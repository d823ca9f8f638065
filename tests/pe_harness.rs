use pesim::{PeInput, PeOutput, PeParams, ProcessingElement, RegAddr};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5eed_0f_9e;

fn new_pe(latency: usize) -> ProcessingElement {
  ProcessingElement::new("dut", PeParams::new(32, latency).unwrap()).unwrap()
}

/// Hold reset for five edges, then five idle edges.
fn reset(pe: &mut ProcessingElement) -> PeOutput {
  let mut output = PeOutput::default();
  for _ in 0..5 {
    output = pe.step(PeInput::reset());
  }
  for _ in 0..5 {
    output = pe.step(PeInput::default());
  }
  output
}

/// Hold `input` for `cycles` edges.
fn hold(pe: &mut ProcessingElement, input: PeInput, cycles: usize) -> PeOutput {
  let mut output = PeOutput::default();
  for _ in 0..cycles {
    output = pe.step(input);
  }
  output
}

#[test]
fn test_reset() {
  let mut pe = new_pe(1);
  let mut rng = StdRng::seed_from_u64(SEED);

  // Dirty every register first.
  pe.step(PeInput::mac(rng.gen(), rng.gen()).with_store(RegAddr::SLOT1));
  pe.step(PeInput::mac(rng.gen(), rng.gen()).with_store(RegAddr::SLOT2));
  pe.step(PeInput::mac(rng.gen(), rng.gen()).with_store(RegAddr::SLOT3).with_finish());
  pe.step(PeInput::mac(200, 200));

  let output = reset(&mut pe);
  assert_eq!(output.out, 0);
  assert_eq!(pe.out(), 0);
  for i in 0..4 {
    assert_eq!(pe.regfile()[i], 0);
  }
}

#[test]
fn test_multiplication_no_regfile_no_dot() {
  let mut pe = new_pe(1);
  let mut rng = StdRng::seed_from_u64(SEED);
  reset(&mut pe);

  for _ in 0..10 {
    let act: u8 = rng.gen();
    let wgt: u8 = rng.gen();
    let output = pe.step(PeInput::mac(act, wgt).with_finish());
    assert_eq!(output.out, u32::from(act) * u32::from(wgt));
    assert_eq!(pe.acc(), 0);
  }
}

#[test]
fn test_multiplication_all_operands() {
  let mut pe = new_pe(1);
  for act in (0..=255u8).step_by(15) {
    for wgt in 0..=255u8 {
      let output = pe.step(PeInput::mac(act, wgt).with_finish());
      assert_eq!(output.out, u32::from(act) * u32::from(wgt));
    }
  }
}

#[test]
fn test_multiplication_no_regfile_with_dot() {
  let mut pe = new_pe(1);
  let mut rng = StdRng::seed_from_u64(SEED);
  reset(&mut pe);

  let mut total = 0u32;
  for _ in 0..10 {
    let act: u8 = rng.gen();
    let wgt: u8 = rng.gen();
    total += u32::from(act) * u32::from(wgt);

    let output = pe.step(PeInput::mac(act, wgt));
    assert_eq!(output.regfile[0], total);
    assert_eq!(output.out, 0);
  }

  // Last cycle to finish the dot product
  let act: u8 = rng.gen();
  let wgt: u8 = rng.gen();
  total += u32::from(act) * u32::from(wgt);

  let output = pe.step(PeInput::mac(act, wgt).with_finish());
  assert_eq!(output.out, total);
  assert_eq!(output.regfile[0], 0);
}

#[test]
fn test_multiplication_with_regfile_with_dot() {
  let mut pe = new_pe(1);
  let mut rng = StdRng::seed_from_u64(SEED);
  reset(&mut pe);

  // Start accumulating and store the weight in regfile[1]
  let act: u8 = rng.gen();
  let wgt: u8 = rng.gen();
  let mut total = u32::from(act) * u32::from(wgt);

  let output = pe.step(PeInput::mac(act, wgt).with_store(RegAddr::SLOT1));
  assert_eq!(output.regfile[0], total);
  assert_eq!(output.regfile[1], u32::from(wgt));

  // Weight reuse with new activations; the live weight input is ignored.
  for _ in 0..10 {
    let act: u8 = rng.gen();
    let noise: u8 = rng.gen();
    total += u32::from(act) * pe.regfile()[1];

    let output = pe.step(PeInput::mac(act, noise).with_reuse(RegAddr::SLOT1));
    assert_eq!(output.regfile[0], total);
    assert_eq!(output.regfile[1], u32::from(wgt));
  }

  // Last cycle to finish the dot product
  let act: u8 = rng.gen();
  let wgt_last: u8 = rng.gen();
  total += u32::from(act) * u32::from(wgt_last);

  let output = pe.step(PeInput::mac(act, wgt_last).with_finish());
  assert_eq!(output.out, total);
  assert_eq!(output.regfile[0], 0);
  assert_eq!(output.regfile[1], u32::from(wgt));
}

#[test]
fn test_weight_slots_are_independent() {
  let mut pe = new_pe(1);
  reset(&mut pe);

  pe.step(PeInput::mac(0, 11).with_store(RegAddr::SLOT1));
  pe.step(PeInput::mac(0, 22).with_store(RegAddr::SLOT2));
  pe.step(PeInput::mac(0, 33).with_store(RegAddr::SLOT3));
  assert_eq!(pe.regfile(), [0, 11, 22, 33]);

  pe.step(PeInput::mac(1, 0).with_reuse(RegAddr::SLOT1));
  pe.step(PeInput::mac(2, 0).with_reuse(RegAddr::SLOT2));
  let output = pe.step(PeInput::mac(3, 0).with_reuse(RegAddr::SLOT3).with_finish());
  assert_eq!(output.out, 11 + 2 * 22 + 3 * 33);
  assert_eq!(pe.regfile(), [0, 11, 22, 33]);
}

#[test]
fn test_idle_edges_accumulate_live_operands() {
  let mut pe = new_pe(1);
  reset(&mut pe);
  pe.step(PeInput::mac(4, 4).with_finish());

  // Zero operands: nothing changes.
  let output = hold(&mut pe, PeInput::default(), 3);
  assert_eq!(output.out, 16);
  assert_eq!(output.regfile[0], 0);

  // Controls low but non-zero operands still accumulate.
  let output = hold(&mut pe, PeInput::mac(2, 3), 3);
  assert_eq!(output.out, 16);
  assert_eq!(output.regfile[0], 18);
}

#[test]
fn test_three_cycle_harness() {
  let mut pe = new_pe(3);
  let mut rng = StdRng::seed_from_u64(SEED);
  reset(&mut pe);

  for _ in 0..10 {
    let act: u8 = rng.gen();
    let wgt: u8 = rng.gen();
    let output = hold(&mut pe, PeInput::mac(act, wgt).with_finish(), 3);
    assert_eq!(output.out, u32::from(act) * u32::from(wgt));
  }
}

#[test]
fn test_three_cycle_harness_with_dot() {
  let mut pe = new_pe(3);
  let mut rng = StdRng::seed_from_u64(SEED);
  reset(&mut pe);

  let mut total = 0u32;
  for _ in 0..10 {
    let act: u8 = rng.gen();
    let wgt: u8 = rng.gen();
    total += u32::from(act) * u32::from(wgt);

    let output = hold(&mut pe, PeInput::mac(act, wgt), 3);
    assert_eq!(output.regfile[0], total);
    assert_eq!(output.out, 0);
  }

  let act: u8 = rng.gen();
  let wgt: u8 = rng.gen();
  total += u32::from(act) * u32::from(wgt);

  let output = hold(&mut pe, PeInput::mac(act, wgt).with_finish(), 3);
  assert_eq!(output.out, total);
  assert_eq!(output.regfile[0], 0);
}

#[test]
fn test_three_cycle_harness_with_regfile() {
  let mut pe = new_pe(3);
  reset(&mut pe);

  let output = hold(&mut pe, PeInput::mac(3, 4).with_store(RegAddr::SLOT1), 3);
  assert_eq!(output.regfile, [12, 4, 0, 0]);

  let output = hold(&mut pe, PeInput::mac(5, 200).with_reuse(RegAddr::SLOT1), 3);
  assert_eq!(output.regfile, [32, 4, 0, 0]);

  let output = hold(&mut pe, PeInput::mac(1, 2).with_finish(), 3);
  assert_eq!(output.out, 34);
  assert_eq!(output.regfile, [0, 4, 0, 0]);
}

#[test]
fn test_held_inputs_at_single_cycle_latency() {
  let mut pe = new_pe(1);
  reset(&mut pe);

  // Every edge is a MAC when latency is one.
  let output = hold(&mut pe, PeInput::mac(3, 4), 3);
  assert_eq!(output.regfile[0], 36);
}

#[test]
fn test_latency_is_exact() {
  for latency in 1..=4 {
    let mut pe = new_pe(latency);
    let first = pe.step(PeInput::mac(9, 10).with_finish());
    let mut outs = vec![first.out];
    for _ in 1..latency + 1 {
      outs.push(pe.step(PeInput::default()).out);
    }

    // The product shows up on edge `latency` and then holds.
    for (edge, out) in outs.iter().enumerate() {
      let expected = if edge + 1 >= latency { 90 } else { 0 };
      assert_eq!(*out, expected, "latency {} edge {}", latency, edge + 1);
    }
  }
}

#[test]
fn test_state_is_a_plain_value() {
  let mut pe = new_pe(1);
  pe.step(PeInput::mac(3, 4).with_store(RegAddr::SLOT2));

  let mut fork = pe.clone();
  fork.step(PeInput::mac(5, 2).with_finish());

  assert_eq!(pe.regfile(), [12, 0, 4, 0]);
  assert_eq!(fork.out(), 22);
  assert_eq!(fork.regfile(), [0, 0, 4, 0]);
}
