//! Shared sizing vocabulary for the flex, grid, and absolute helpers (§4.3.3).

/// How one track, slot, or item declares its size along an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// No explicit size; shares leftover space equally with other `Auto` slots.
    Auto,
    /// A literal cell count, clamped to the available extent.
    Px(u16),
    /// A percentage (0..=100) of the available extent.
    Percent(u8),
    /// A proportional share of the available extent, weighted against other `Fraction` slots.
    Fraction(u32),
}

/// Distribute `extent` cells (minus `(n - 1) * gap`) across `dims`, in order:
/// fixed (`Px`/`Percent`) sizes are resolved first, then `Fraction` slots share what remains
/// by weight, and finally any `Auto` slots split whatever is left equally. The last slot in
/// each group absorbs integer-division remainder so the total always equals the input extent
/// exactly (used by [`super::grid`] tracks and [`super::absolute`] fraction sharing).
pub(crate) fn distribute(extent: u16, gap: u16, dims: &[Dimension]) -> Vec<u16> {
    if dims.is_empty() {
        return Vec::new();
    }
    let n = dims.len();
    let total_gap = gap.saturating_mul((n - 1) as u16);
    let available = extent.saturating_sub(total_gap) as u32;

    let mut sizes = vec![0u16; n];
    let mut fixed_total: u32 = 0;
    let mut fraction_idxs = Vec::new();
    let mut auto_idxs = Vec::new();

    for (i, d) in dims.iter().enumerate() {
        match *d {
            Dimension::Auto => auto_idxs.push(i),
            Dimension::Px(px) => {
                let s = (px as u32).min(available);
                sizes[i] = s as u16;
                fixed_total += s;
            }
            Dimension::Percent(pct) => {
                let pct = (pct.min(100)) as u32;
                let s = available * pct / 100;
                sizes[i] = s as u16;
                fixed_total += s;
            }
            Dimension::Fraction(_) => fraction_idxs.push(i),
        }
    }

    let remaining_after_fixed = available.saturating_sub(fixed_total);
    let fraction_weight: u32 = fraction_idxs
        .iter()
        .map(|&i| match dims[i] {
            Dimension::Fraction(w) => w.max(1),
            _ => unreachable!(),
        })
        .sum();

    if !fraction_idxs.is_empty() && fraction_weight > 0 {
        let mut used = 0u32;
        for (k, &i) in fraction_idxs.iter().enumerate() {
            let w = match dims[i] {
                Dimension::Fraction(w) => w.max(1),
                _ => unreachable!(),
            };
            let share = if k + 1 == fraction_idxs.len() {
                remaining_after_fixed.saturating_sub(used)
            } else {
                remaining_after_fixed * w / fraction_weight
            };
            sizes[i] = share as u16;
            used += share;
        }
    } else if !auto_idxs.is_empty() {
        let share = remaining_after_fixed / auto_idxs.len() as u32;
        let mut used = 0u32;
        for (k, &i) in auto_idxs.iter().enumerate() {
            let s = if k + 1 == auto_idxs.len() {
                remaining_after_fixed.saturating_sub(used)
            } else {
                share
            };
            sizes[i] = s as u16;
            used += s;
        }
    }

    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribute_fixed_only() {
        let sizes = distribute(100, 0, &[Dimension::Px(20), Dimension::Px(30)]);
        assert_eq!(sizes, vec![20, 30]);
    }

    #[test]
    fn test_distribute_fraction_fills_remainder() {
        let sizes = distribute(100, 0, &[Dimension::Px(20), Dimension::Fraction(1), Dimension::Fraction(1)]);
        assert_eq!(sizes, vec![20, 40, 40]);
    }

    #[test]
    fn test_distribute_auto_splits_equally() {
        let sizes = distribute(90, 0, &[Dimension::Auto, Dimension::Auto, Dimension::Auto]);
        assert_eq!(sizes, vec![30, 30, 30]);
    }

    #[test]
    fn test_distribute_accounts_for_gap() {
        let sizes = distribute(100, 10, &[Dimension::Fraction(1), Dimension::Fraction(1)]);
        assert_eq!(sizes[0] + sizes[1], 90);
    }
}
