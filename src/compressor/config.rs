use crate::error::{Error, Result};

/// Hyperparameters and policies of one compression run.
///
/// ```
/// use graphzip::compressor::Config;
///
/// let config = Config::new().with_alpha(3).with_theta(10).with_directed(true);
/// assert_eq!(config.alpha(), 3);
/// assert!(config.validate().is_ok());
/// assert!(Config::new().with_theta(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    alpha: usize,
    theta: usize,
    directed: bool,
    add_implicit_vertices: bool,
    label_history_per_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha: 10,
            theta: usize::MAX,
            directed: false,
            add_implicit_vertices: true,
            label_history_per_file: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges per batch.
    pub fn with_alpha(mut self, alpha: usize) -> Self {
        self.alpha = alpha;
        self
    }

    /// Maximum number of dictionary entries kept after each batch.
    pub fn with_theta(mut self, theta: usize) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Synthesize vertices referenced by edges but never declared.
    pub fn with_add_implicit_vertices(mut self, add_implicit_vertices: bool) -> Self {
        self.add_implicit_vertices = add_implicit_vertices;
        self
    }

    /// Forget the declared vertices at the end of every file.
    pub fn with_label_history_per_file(mut self, label_history_per_file: bool) -> Self {
        self.label_history_per_file = label_history_per_file;
        self
    }

    pub fn alpha(&self) -> usize {
        self.alpha
    }

    pub fn theta(&self) -> usize {
        self.theta
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    pub fn add_implicit_vertices(&self) -> bool {
        self.add_implicit_vertices
    }

    pub fn label_history_per_file(&self) -> bool {
        self.label_history_per_file
    }

    pub fn validate(&self) -> Result<()> {
        if self.alpha == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "alpha",
                value: self.alpha,
            });
        }
        if self.theta == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "theta",
                value: self.theta,
            });
        }
        Ok(())
    }
}
