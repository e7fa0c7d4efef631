use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::identity::models::ConfirmationCode;
use crate::identity::ports::CodeGenerator;

const CODE_MIN: u32 = 10_000;
const CODE_MAX: u32 = 99_999;

/// Uniform five-digit code generator.
///
/// Seeded once from OS entropy at construction and shared by all callers.
pub struct RandomCodeGenerator {
    rng: Mutex<StdRng>,
}

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> ConfirmationCode {
        // A panic while holding the lock cannot leave the rng in a bad state
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let value = rng.gen_range(CODE_MIN..=CODE_MAX);
        ConfirmationCode::new(value.to_string())
    }
}
