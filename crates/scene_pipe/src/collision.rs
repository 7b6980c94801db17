use crate::command::{Arg, Command, Value};
use crate::error::{SceneError, SceneResult};

/// Predefined collision matrix shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionTemplate {
    /// No group pair collides.
    None,
    /// Every group pair collides, including within a group.
    All,
    /// Only members of *different* groups collide.
    Inter,
    /// Only members of the *same* group collide.
    Intra,
}

#[derive(Debug)]
struct Matrix {
    dim: usize,
    cells: Vec<bool>,
}

impl Matrix {
    fn from_template(dim: usize, template: CollisionTemplate) -> Self {
        let mut matrix = Matrix {
            dim,
            cells: vec![false; dim * dim],
        };
        for i in 0..dim {
            for j in 0..dim {
                let cell = match template {
                    CollisionTemplate::None => false,
                    CollisionTemplate::All => true,
                    CollisionTemplate::Inter => i != j,
                    CollisionTemplate::Intra => i == j,
                };
                matrix.set(i, j, cell);
            }
        }
        matrix
    }

    fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.dim + j]
    }

    fn set(&mut self, i: usize, j: usize, value: bool) {
        self.cells[i * self.dim + j] = value;
    }

    /// Groups allocated after construction join unconnected: the matrix grows
    /// with all-zero rows and columns regardless of the template it was built
    /// from.
    fn grow(&mut self, dim: usize) {
        if dim <= self.dim {
            return;
        }
        let mut grown = vec![false; dim * dim];
        for i in 0..self.dim {
            for j in 0..self.dim {
                grown[i * dim + j] = self.get(i, j);
            }
        }
        self.dim = dim;
        self.cells = grown;
    }
}

/// Named collision groups plus the symmetric permission matrix over them.
///
/// Group names map 1:1 to indices in first-seen order; the indices are stable
/// for the life of the scene and are the same indices body commands carry.
#[derive(Debug, Default)]
pub struct CollisionTopology {
    groups: Vec<String>,
    matrix: Option<Matrix>,
}

impl CollisionTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `name`, allocating the next index on first sight.
    pub fn group_id(&mut self, name: &str) -> usize {
        if let Some(index) = self.groups.iter().position(|g| g == name) {
            return index;
        }
        self.groups.push(name.to_string());
        self.groups.len() - 1
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn group_names(&self) -> &[String] {
        &self.groups
    }

    /// Build the `G×G` matrix from a template. May be called at most once.
    pub fn build_matrix(&mut self, template: CollisionTemplate) -> SceneResult<()> {
        if self.matrix.is_some() {
            return Err(SceneError::MatrixAlreadyBuilt);
        }
        self.matrix = Some(Matrix::from_template(self.groups.len(), template));
        Ok(())
    }

    /// Allow collisions between `group_a` and `group_b` (symmetric).
    ///
    /// Unseen names silently allocate a new, unconnected group; an absent
    /// matrix is first implicitly built from the `None` template.
    pub fn assign(&mut self, group_a: &str, group_b: &str) {
        self.set_pair(group_a, group_b, true);
    }

    /// Forbid collisions between `group_a` and `group_b` (symmetric inverse
    /// of [`assign`](Self::assign)).
    pub fn remove(&mut self, group_a: &str, group_b: &str) {
        self.set_pair(group_a, group_b, false);
    }

    fn set_pair(&mut self, group_a: &str, group_b: &str, value: bool) {
        let a = self.group_id(group_a);
        let b = self.group_id(group_b);
        let matrix = self.ensure_matrix();
        matrix.set(a, b, value);
        matrix.set(b, a, value);
    }

    fn ensure_matrix(&mut self) -> &mut Matrix {
        let dim = self.groups.len();
        let matrix = self
            .matrix
            .get_or_insert_with(|| Matrix::from_template(dim, CollisionTemplate::None));
        matrix.grow(dim);
        matrix
    }

    /// Whether members of the two groups may collide. Absent matrix reads as
    /// all-zero; unseen names read as unconnected.
    pub fn may_collide(&self, group_a: &str, group_b: &str) -> bool {
        let (Some(a), Some(b)) = (
            self.groups.iter().position(|g| g == group_a),
            self.groups.iter().position(|g| g == group_b),
        ) else {
            return false;
        };
        match &self.matrix {
            Some(matrix) if a < matrix.dim && b < matrix.dim => matrix.get(a, b),
            _ => false,
        }
    }

    /// Serialize the finalized matrix: the group count, then the flattened
    /// upper triangle (diagonal included) in row-major order.
    ///
    /// Returns None when no group was ever named — such scenes carry no
    /// matrix command at all.
    pub fn finalize(&mut self) -> Option<Command> {
        if self.groups.is_empty() {
            return None;
        }
        let matrix = self.ensure_matrix();
        let mut cells = Vec::with_capacity(matrix.dim * (matrix.dim + 1) / 2);
        for i in 0..matrix.dim {
            for j in i..matrix.dim {
                cells.push(Value::Int(i64::from(matrix.get(i, j))));
            }
        }
        Some(
            Command::new("CollisionMatrix")
                .arg(Arg::int(matrix.dim as i64))
                .arg(Arg::Sequence(cells)),
        )
    }
}
