use approx::{assert_abs_diff_eq, assert_relative_eq};
use pg_gemm::{dgemm, dgemm_with_config, gemm, Dispatch, GemmConfig, GemmError, General, Transpose};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FLAGS: [Transpose; 2] = [Transpose::NoTrans, Transpose::Trans];

/// Row-major buffer for a `rows x cols` matrix with `pad` extra columns per row.
/// Padding is filled with NaN so any stray read or write shows up.
fn random_strided(rng: &mut StdRng, rows: usize, cols: usize, pad: usize) -> Vec<f64> {
    let stride = cols + pad;
    let mut data = vec![f64::NAN; rows * stride];
    for i in 0..rows {
        for j in 0..cols {
            data[i * stride + j] = rng.gen_range(-1.0..1.0);
        }
    }
    data
}

/// Textbook triple loop.
#[allow(clippy::too_many_arguments)]
fn naive(
    t_a: Transpose,
    t_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for l in 0..k {
                let av = match t_a {
                    Transpose::NoTrans => a[i * lda + l],
                    Transpose::Trans => a[l * lda + i],
                };
                let bv = match t_b {
                    Transpose::NoTrans => b[l * ldb + j],
                    Transpose::Trans => b[j * ldb + l],
                };
                sum += av * bv;
            }
            c[i * n + j] = sum;
        }
    }
    c
}

struct Problem {
    t_a: Transpose,
    t_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    a: Vec<f64>,
    lda: usize,
    b: Vec<f64>,
    ldb: usize,
}

impl Problem {
    fn random(seed: u64, t_a: Transpose, t_b: Transpose, m: usize, n: usize, k: usize, pad: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (ar, ac) = t_a.apply(m, k);
        let (br, bc) = t_b.apply(k, n);
        Problem {
            t_a,
            t_b,
            m,
            n,
            k,
            a: random_strided(&mut rng, ar, ac, pad),
            lda: ac + pad,
            b: random_strided(&mut rng, br, bc, pad),
            ldb: bc + pad,
        }
    }

    fn run(&self, config: &GemmConfig, alpha: f64, beta: f64, c: &mut [f64], ldc: usize) -> Dispatch {
        dgemm_with_config(
            config, self.t_a, self.t_b, self.m, self.n, self.k, alpha, &self.a, self.lda, &self.b,
            self.ldb, beta, c, ldc,
        )
        .unwrap()
    }

    fn reference(&self) -> Vec<f64> {
        naive(self.t_a, self.t_b, self.m, self.n, self.k, &self.a, self.lda, &self.b, self.ldb)
    }
}

#[test]
fn test_concrete_2x3_times_3x2() {
    let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
    let mut c = [0.0; 4];
    dgemm(Transpose::NoTrans, Transpose::NoTrans, 2, 2, 3, 1.0, &a, 3, &b, 2, 0.0, &mut c, 2).unwrap();
    assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
}

#[test]
fn test_parallel_matches_serial_all_transposes() {
    let (m, n, k) = (150, 170, 90);
    for (idx, &t_a) in FLAGS.iter().enumerate() {
        for (jdx, &t_b) in FLAGS.iter().enumerate() {
            let p = Problem::random(10 + (idx * 2 + jdx) as u64, t_a, t_b, m, n, k, 3);
            let ldc = n + 1;
            let mut c_par = vec![0.25; m * ldc];
            for row in c_par.chunks_mut(ldc) {
                row[n] = f64::NAN;
            }
            let mut c_ser = c_par.clone();

            let d_par = p.run(&GemmConfig::default(), 1.5, -0.5, &mut c_par, ldc);
            let d_ser = p.run(&GemmConfig::serial(), 1.5, -0.5, &mut c_ser, ldc);
            assert!(matches!(d_par, Dispatch::Parallel { tiles: 9, .. }), "{:?}", d_par);
            assert_eq!(d_ser, Dispatch::Serial);

            for (row_par, row_ser) in c_par.chunks(ldc).zip(c_ser.chunks(ldc)) {
                assert!(row_par[n].is_nan() && row_ser[n].is_nan());
                for (x, y) in row_par[..n].iter().zip(&row_ser[..n]) {
                    assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-12);
                }
            }
        }
    }
}

#[test]
fn test_tiling_130_matches_naive() {
    let config = GemmConfig {
        block_size: 64,
        ..GemmConfig::default()
    };
    for &t_a in &FLAGS {
        for &t_b in &FLAGS {
            let p = Problem::random(7, t_a, t_b, 130, 130, 130, 0);
            let mut c = vec![f64::NAN; 130 * 130];
            let d = p.run(&config, 1.0, 0.0, &mut c, 130);
            assert!(matches!(d, Dispatch::Parallel { tiles: 9, .. }));
            for (x, y) in c.iter().zip(p.reference()) {
                assert_abs_diff_eq!(*x, y, epsilon = 1e-10);
            }
        }
    }
}

#[test]
fn test_empty_output_leaves_c_untouched() {
    // m == 0 and n == 0 return before beta is applied, even with k > 0.
    let p = Problem::random(8, Transpose::NoTrans, Transpose::Trans, 0, 5, 7, 1);
    let mut c = vec![f64::NAN; 4];
    let d = p.run(&GemmConfig::default(), 1.0, 0.0, &mut c, 5);
    assert_eq!(d, Dispatch::Skipped);
    assert!(c.iter().all(|v| v.is_nan()));

    let p = Problem::random(9, Transpose::Trans, Transpose::NoTrans, 3, 0, 7, 2);
    let mut c = vec![f64::NAN; 6];
    let d = p.run(&GemmConfig::default(), 2.0, 0.0, &mut c, 2);
    assert_eq!(d, Dispatch::Skipped);
    assert!(c.iter().all(|v| v.is_nan()));
}

#[test]
fn test_alpha_zero_beta_one_leaves_c() {
    let p = Problem::random(3, Transpose::Trans, Transpose::NoTrans, 200, 200, 50, 0);
    let mut rng = StdRng::seed_from_u64(99);
    let original: Vec<f64> = (0..200 * 200).map(|_| rng.gen_range(-10.0..10.0)).collect();
    let mut c = original.clone();
    let d = p.run(&GemmConfig::default(), 0.0, 1.0, &mut c, 200);
    assert_eq!(d, Dispatch::Skipped);
    assert_eq!(c, original);
}

#[test]
fn test_beta_zero_ignores_prior_contents() {
    let p = Problem::random(4, Transpose::NoTrans, Transpose::Trans, 140, 130, 70, 1);
    let mut poisoned = vec![f64::NAN; 140 * 130];
    for (i, v) in poisoned.iter_mut().enumerate() {
        if i % 3 == 0 {
            *v = f64::INFINITY;
        }
    }
    let mut clean = vec![0.0; 140 * 130];
    p.run(&GemmConfig::default(), 2.0, 0.0, &mut poisoned, 130);
    p.run(&GemmConfig::default(), 2.0, 0.0, &mut clean, 130);
    assert!(poisoned.iter().all(|v| v.is_finite()));
    assert_eq!(poisoned, clean);
}

#[test]
fn test_identity_reproduces_op_a() {
    let (m, k) = (90, 70);
    let a = General::from_fn(m, k, |i, j| (i as f64) - 0.5 * (j as f64));
    let at = a.transpose();
    let id = General::identity(k);
    for &t_b in &FLAGS {
        let mut c = General::from_fn(m, k, |_, _| f64::NAN);
        gemm(Transpose::NoTrans, t_b, 1.0, &a, &id, 0.0, &mut c).unwrap();
        assert_eq!(c, a);

        // Stored transposed, op(A^T) is A again.
        let mut c = General::zeros(m, k);
        gemm(Transpose::Trans, t_b, 1.0, &at, &id, 0.0, &mut c).unwrap();
        assert_eq!(c, a);
    }
}

#[test]
fn test_below_threshold_is_serial() {
    // 100x60 gives 2x1 tiles of 64, under the default threshold of 4.
    let p = Problem::random(5, Transpose::NoTrans, Transpose::NoTrans, 100, 60, 300, 0);
    let mut c_default = vec![0.0; 100 * 60];
    let mut c_serial = vec![0.0; 100 * 60];
    let d = p.run(&GemmConfig::default(), 1.0, 0.0, &mut c_default, 60);
    p.run(&GemmConfig::serial(), 1.0, 0.0, &mut c_serial, 60);
    assert_eq!(d, Dispatch::Serial);
    assert_eq!(c_default, c_serial);
}

#[test]
fn test_exactly_threshold_goes_parallel() {
    let p = Problem::random(6, Transpose::NoTrans, Transpose::NoTrans, 100, 100, 20, 0);
    let mut c = vec![0.0; 100 * 100];
    let d = p.run(&GemmConfig::default(), 1.0, 0.0, &mut c, 100);
    assert!(matches!(d, Dispatch::Parallel { tiles: 4, .. }));
}

#[test]
fn test_errors_leave_c_untouched() {
    let a = vec![1.0; 6];
    let b = vec![1.0; 6];
    let mut c = vec![3.0; 4];

    let err = dgemm(Transpose::Trans, Transpose::NoTrans, 2, 2, 3, 1.0, &a, 1, &b, 2, 0.0, &mut c, 2)
        .unwrap_err();
    assert!(matches!(err, GemmError::LeadingDimension { name: "lda", ld: 1, row_len: 2 }));

    let err = dgemm(Transpose::NoTrans, Transpose::NoTrans, 2, 2, 4, 1.0, &a, 4, &b, 2, 0.0, &mut c, 2)
        .unwrap_err();
    assert!(matches!(err, GemmError::Shape { rows: 2, cols: 4, len: 6, .. }));

    assert_eq!(c, vec![3.0; 4]);
}

#[test]
fn test_flag_codes() {
    assert!(matches!(Transpose::try_from(113), Err(GemmError::InvalidFlag(_))));
    assert_eq!(Transpose::try_from('t').unwrap(), Transpose::Trans);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_parallel_agrees_with_serial(
        m in 1usize..40,
        n in 1usize..40,
        k in 0usize..40,
        block in 1usize..9,
        pad in 0usize..3,
        t_a in any::<bool>(),
        t_b in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let p = Problem::random(seed, t_a.into(), t_b.into(), m, n, k, pad);
        let config = GemmConfig {
            block_size: block,
            min_parallel_blocks: 1,
            ..GemmConfig::default()
        };
        let ldc = n + pad;
        let mut c_par = vec![1.0; m * ldc];
        let mut c_ser = c_par.clone();
        p.run(&config, 0.75, 0.5, &mut c_par, ldc);
        p.run(&GemmConfig::serial(), 0.75, 0.5, &mut c_ser, ldc);
        for (x, y) in c_par.iter().zip(&c_ser) {
            prop_assert!((x - y).abs() <= 1e-12, "parallel {} vs serial {}", x, y);
        }
    }
}
