//! Weighted-least-squares constraint solver (§4.3.1).
//!
//! Every constraint is canonicalized to an equality with a weight; `GE` is flipped to `LE` by
//! negation, and `LE` gets a fresh non-negative slack variable. The system is solved as
//! `(AᵀWA)x = AᵀWb` by Gaussian elimination with partial pivoting — the same shape of problem
//! Cassowary-style layout solvers face, sized down to what a terminal UI's node count needs.

use crate::error::LayoutError;
use std::collections::HashMap;

/// A handle to one scalar unknown in a [`ConstraintSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(pub(crate) usize);

/// The relation a constraint's left-hand side holds against its constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

/// Fixed constraint strengths. Weights are chosen far enough apart that a lower strength can
/// never outweigh a violated higher one in the least-squares objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Required,
    Strong,
    Medium,
    Weak,
}

impl Strength {
    pub(crate) fn weight(self) -> f64 {
        match self {
            Strength::Required => 1e12,
            Strength::Strong => 1e6,
            Strength::Medium => 1e3,
            Strength::Weak => 1.0,
        }
    }
}

struct Row {
    coeffs: HashMap<usize, f64>,
    constant: f64,
    weight: f64,
    strength: Strength,
    /// Set when this row originated from an `Le`/`Ge` constraint: the index of its slack
    /// variable, checked for non-negativity after solving.
    slack_var: Option<usize>,
}

/// The set of variables and canonicalized constraint rows to be solved together.
#[derive(Default)]
pub struct ConstraintSpace {
    num_variables: usize,
    rows: Vec<Row>,
    has_required: bool,
}

impl ConstraintSpace {
    pub fn new() -> Self {
        ConstraintSpace::default()
    }

    /// Register a new unknown, implicitly initialized to 0 until solved.
    pub fn new_variable(&mut self) -> Variable {
        let v = Variable(self.num_variables);
        self.num_variables += 1;
        v
    }

    /// Add `Σ terms·x = constant` (or `≤`/`≥`) at the given strength. `Ge` is canonicalized by
    /// negation into `Le`; `Le` receives a fresh slack variable, reducing every relation to an
    /// equality row before it reaches the solver.
    pub fn add_constraint(
        &mut self,
        terms: &[(Variable, f64)],
        relation: Relation,
        constant: f64,
        strength: Strength,
    ) {
        let (mut coeffs, constant, relation) = match relation {
            Relation::Ge => {
                let coeffs: HashMap<usize, f64> = terms.iter().map(|(v, a)| (v.0, -a)).collect();
                (coeffs, -constant, Relation::Le)
            }
            other => {
                let coeffs: HashMap<usize, f64> = terms.iter().map(|(v, a)| (v.0, *a)).collect();
                (coeffs, constant, other)
            }
        };

        let slack_var = if relation == Relation::Le {
            let slack = self.new_variable();
            coeffs.insert(slack.0, 1.0);
            Some(slack.0)
        } else {
            None
        };

        if strength == Strength::Required {
            self.has_required = true;
        }

        self.rows.push(Row {
            coeffs,
            constant,
            weight: strength.weight(),
            strength,
            slack_var,
        });
    }

    /// Solve the accumulated system, returning an assignment for every registered variable.
    pub fn solve(&self) -> Result<Solution, LayoutError> {
        if !self.has_required || self.num_variables == 0 {
            return Err(LayoutError::Underdetermined);
        }

        let n = self.num_variables;
        let mut ata = vec![vec![0.0_f64; n]; n];
        let mut atb = vec![0.0_f64; n];

        for row in &self.rows {
            for (&i, &ai) in &row.coeffs {
                atb[i] += row.weight * ai * row.constant;
                for (&j, &aj) in &row.coeffs {
                    ata[i][j] += row.weight * ai * aj;
                }
            }
        }

        let mut values = match gaussian_eliminate(ata, atb) {
            Ok(x) => x,
            Err(LayoutError::SingularSystem) => return Err(LayoutError::Underdetermined),
            Err(e) => return Err(e),
        };

        for row in &self.rows {
            if let Some(slack_idx) = row.slack_var {
                if values[slack_idx] < -1e-6 {
                    return Err(LayoutError::NegativeSlack);
                }
                if values[slack_idx] < 0.0 {
                    values[slack_idx] = 0.0;
                }
            } else if row.strength == Strength::Required {
                let lhs: f64 = row.coeffs.iter().map(|(&i, &a)| a * values[i]).sum();
                if (lhs - row.constant).abs() > 1e-5 {
                    return Err(LayoutError::Overdetermined);
                }
            }
        }

        Ok(Solution { values })
    }
}

/// A solved assignment for every [`Variable`] in a [`ConstraintSpace`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<f64>,
}

impl Solution {
    pub fn value(&self, v: Variable) -> f64 {
        self.values[v.0]
    }
}

/// Gaussian elimination with partial pivoting on the augmented system `[a | b]`. Pivot
/// threshold `1e-9`; elimination steps with a negligible multiplier (`< 1e-12`) are skipped.
fn gaussian_eliminate(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, LayoutError> {
    let n = b.len();
    for col in 0..n {
        let mut pivot_row = col;
        let mut max_val = a[col][col].abs();
        for r in (col + 1)..n {
            if a[r][col].abs() > max_val {
                max_val = a[r][col].abs();
                pivot_row = r;
            }
        }
        if max_val < 1e-9 {
            return Err(LayoutError::SingularSystem);
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for r in (col + 1)..n {
            let factor = a[r][col] / a[col][col];
            if factor.abs() < 1e-12 {
                continue;
            }
            for c in col..n {
                a[r][c] -= factor * a[col][c];
            }
            b[r] -= factor * b[col];
        }
    }

    let mut x = vec![0.0_f64; n];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_required_equality() {
        let mut space = ConstraintSpace::new();
        let x = space.new_variable();
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 42.0, Strength::Required);
        let sol = space.solve().unwrap();
        assert!((sol.value(x) - 42.0).abs() < 1e-6);
    }

    #[test]
    fn test_underdetermined_without_required() {
        let mut space = ConstraintSpace::new();
        let x = space.new_variable();
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 42.0, Strength::Weak);
        assert_eq!(space.solve(), Err(LayoutError::Underdetermined));
    }

    #[test]
    fn test_inequality_feasible() {
        let mut space = ConstraintSpace::new();
        let x = space.new_variable();
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 10.0, Strength::Required);
        space.add_constraint(&[(x, 1.0)], Relation::Le, 20.0, Strength::Required);
        assert!(space.solve().is_ok());
    }

    #[test]
    fn test_conflicting_required_equalities_overdetermined() {
        let mut space = ConstraintSpace::new();
        let x = space.new_variable();
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 10.0, Strength::Required);
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 20.0, Strength::Required);
        assert_eq!(space.solve(), Err(LayoutError::Overdetermined));
    }

    #[test]
    fn test_weak_preference_yields_to_required() {
        let mut space = ConstraintSpace::new();
        let x = space.new_variable();
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 100.0, Strength::Required);
        space.add_constraint(&[(x, 1.0)], Relation::Eq, 0.0, Strength::Weak);
        let sol = space.solve().unwrap();
        assert!((sol.value(x) - 100.0).abs() < 1e-3);
    }
}
