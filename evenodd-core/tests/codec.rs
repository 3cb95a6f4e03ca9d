use evenodd_core::codec::EvenOdd;
use evenodd_core::stripe::Stripe;
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_stripe(p: usize, seed: u64) -> Stripe {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut s = Stripe::new(p);
    for d in 0..p {
        for w in s.col_mut(d) {
            *w = rng.gen();
        }
    }
    s
}

fn snapshot(s: &Stripe) -> Vec<Vec<u64>> {
    (0..s.p() + 2).map(|d| s.col(d).to_vec()).collect()
}

#[test]
fn rejects_bad_parameters() {
    for p in [0usize, 1, 2, 4, 9, 15, 99, 101] {
        assert!(EvenOdd::new(p).is_err(), "p={}", p);
    }
    for p in [3usize, 5, 7, 97] {
        assert!(EvenOdd::new(p).is_ok(), "p={}", p);
    }
}

#[test]
fn rejects_bad_missing_sets() {
    let codec = EvenOdd::new(5).unwrap();
    let mut s = Stripe::new(5);
    assert!(codec.reconstruct(&mut s, &[7]).is_err());
    assert!(codec.reconstruct(&mut s, &[2, 2]).is_err());
    assert!(codec.reconstruct(&mut s, &[3, 1]).is_err());
    assert!(codec.reconstruct(&mut s, &[0, 1, 2]).is_err());
}

#[test]
fn rejects_mismatched_stripe() {
    let codec = EvenOdd::new(5).unwrap();
    let mut s = Stripe::new(7);
    assert!(codec.encode(&mut s).is_err());
}

#[test]
fn parity_invariants_hold() {
    for p in [3usize, 5, 17] {
        let codec = EvenOdd::new(p).unwrap();
        let mut s = random_stripe(p, 11);
        codec.encode(&mut s).unwrap();

        for r in 0..p - 1 {
            let x = (0..p).fold(0u64, |acc, d| acc ^ s.col(d)[r]);
            assert_eq!(x, s.col(p)[r], "row parity p={} r={}", p, r);
        }

        let mut b = vec![0u64; 2 * p - 1];
        for d in 0..p {
            for r in 0..p - 1 {
                b[d + r] ^= s.col(d)[r];
            }
        }
        let adjuster = b[p - 1];
        for k in 0..p - 1 {
            assert_eq!(
                b[k] ^ b[k + p] ^ adjuster,
                s.col(p + 1)[k],
                "diagonal parity p={} k={}",
                p,
                k
            );
        }
    }
}

#[test]
fn reconstruct_every_single_erasure() {
    for p in [3usize, 5, 7, 13] {
        let codec = EvenOdd::new(p).unwrap();
        let mut s = random_stripe(p, 7);
        codec.encode(&mut s).unwrap();
        let want = snapshot(&s);
        for i in 0..p + 2 {
            let mut broken = s.clone();
            broken.zero_col(i);
            codec.reconstruct(&mut broken, &[i]).unwrap();
            assert_eq!(snapshot(&broken), want, "p={} col={}", p, i);
        }
    }
}

#[test]
fn reconstruct_every_double_erasure() {
    for p in [3usize, 5, 7, 11] {
        let codec = EvenOdd::new(p).unwrap();
        let mut s = random_stripe(p, 99);
        codec.encode(&mut s).unwrap();
        let want = snapshot(&s);
        for i in 0..p + 2 {
            for j in i + 1..p + 2 {
                let mut broken = s.clone();
                broken.zero_col(i);
                broken.zero_col(j);
                codec.reconstruct(&mut broken, &[i, j]).unwrap();
                assert_eq!(snapshot(&broken), want, "p={} pair=({},{})", p, i, j);
            }
        }
    }
}

#[test]
fn empty_missing_set_is_a_no_op() {
    let codec = EvenOdd::new(3).unwrap();
    let mut s = random_stripe(3, 1);
    codec.encode(&mut s).unwrap();
    let want = snapshot(&s);
    codec.reconstruct(&mut s, &[]).unwrap();
    assert_eq!(snapshot(&s), want);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn double_erasure_recovers(seed in any::<u64>(), pick in 0usize..5, a in 0usize..32, b in 0usize..32) {
        let p = [3usize, 5, 7, 11, 13][pick];
        let i = a % (p + 2);
        let j = b % (p + 2);
        prop_assume!(i < j);

        let codec = EvenOdd::new(p).unwrap();
        let mut s = random_stripe(p, seed);
        codec.encode(&mut s).unwrap();
        let want = snapshot(&s);

        let mut broken = s.clone();
        broken.zero_col(i);
        broken.zero_col(j);
        codec.reconstruct(&mut broken, &[i, j]).unwrap();
        prop_assert_eq!(snapshot(&broken), want);
    }
}
