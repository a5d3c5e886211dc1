use crate::env::errors::EnvError;

/// Outcome of one transition: observation, reward, done flag and extra info.
pub type StepResult<O, I> = (O, f32, bool, I);

/// Classic reset/step environment contract.
pub trait Env: Send {
    type Obs: Send + Clone + 'static;
    type Act: Send + Clone + 'static;
    type Info: Send + Clone + 'static;

    fn reset(&mut self) -> Result<Self::Obs, EnvError>;
    fn step(&mut self, act: Self::Act) -> Result<StepResult<Self::Obs, Self::Info>, EnvError>;
    fn close(&mut self) -> Result<(), EnvError>;
}
