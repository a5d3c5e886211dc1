//! pyo3 bindings. Python objects stand in for the tokenizer, generator and scorer:
//!
//! - tokenizer: `encode(text) -> list[int]`, `decode(list[int]) -> str`, and
//!   `eos_token_id` / `vocab_size` attributes
//! - generator: `generator(tokens, **generation_kwargs) -> list[int]` (continuation only)
//! - scorer: `scorer(query_tokens, response_tokens) -> float`

use pyo3::create_exception;
use pyo3::exceptions::PyException;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use colloquy::{
    EnvError, GenerationOutput, GenerationRequest, Generator, Observation, Scorer, ServiceError,
    StopReason, TextEnvironment, TokenId, Tokenizer,
};

create_exception!(pycolloquy, ColloquyError, PyException);

fn to_py_err(err: EnvError) -> PyErr {
    ColloquyError::new_err(err.to_string())
}

fn to_service_err(err: PyErr) -> ServiceError {
    ServiceError::Other(Box::new(err))
}

struct PyTokenizer {
    inner: Py<PyAny>,
    eos_token_id: TokenId,
    vocab_size: usize,
}

impl PyTokenizer {
    fn new(py: Python<'_>, inner: Py<PyAny>) -> PyResult<Self> {
        let bound = inner.bind(py);
        let eos_token_id = bound.getattr("eos_token_id")?.extract()?;
        let vocab_size = bound.getattr("vocab_size")?.extract()?;
        Ok(Self {
            inner,
            eos_token_id,
            vocab_size,
        })
    }
}

impl Tokenizer for PyTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ServiceError> {
        Python::with_gil(|py| {
            self.inner
                .bind(py)
                .call_method1("encode", (text,))?
                .extract::<Vec<TokenId>>()
        })
        .map_err(to_service_err)
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String, ServiceError> {
        Python::with_gil(|py| {
            self.inner
                .bind(py)
                .call_method1("decode", (tokens.to_vec(),))?
                .extract::<String>()
        })
        .map_err(to_service_err)
    }

    fn eos_token_id(&self) -> TokenId {
        self.eos_token_id
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

/// Calls the Python generator with the configured kwargs rebuilt by `json.loads`,
/// so it only ever sees JSON values (dicts, lists, str, int, float, bool, None).
struct PyGenerator {
    inner: Py<PyAny>,
}

impl Generator for PyGenerator {
    fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ServiceError> {
        let config_json = serde_json::to_string(&request.config)
            .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;
        let tokens = Python::with_gil(|py| -> PyResult<Vec<TokenId>> {
            let kwargs = py
                .import("json")?
                .call_method1("loads", (config_json,))?
                .downcast_into::<PyDict>()?;
            if !kwargs.contains("pad_token_id")? {
                kwargs.set_item("pad_token_id", request.pad_token_id)?;
            }
            self.inner
                .bind(py)
                .call((request.prompt,), Some(&kwargs))?
                .extract()
        })
        .map_err(to_service_err)?;
        Ok(GenerationOutput::new(tokens, StopReason::Other("unreported".to_string())))
    }
}

struct PyScorer {
    inner: Py<PyAny>,
}

impl Scorer for PyScorer {
    fn score(&self, query: &[TokenId], response: &[TokenId]) -> Result<f32, ServiceError> {
        Python::with_gil(|py| {
            self.inner
                .bind(py)
                .call1((query.to_vec(), response.to_vec()))?
                .extract::<f32>()
        })
        .map_err(to_service_err)
    }
}

fn observation_parts(obs: Observation) -> (Vec<TokenId>, Vec<u32>) {
    let mask = obs.mask.into_iter().map(u32::from).collect();
    (obs.tokens, mask)
}

/// Turn-based text environment driven by Python tokenizer, generator and scorer objects.
///
/// `generation_kwargs` is stored as JSON and passed to the generator on every step.
/// Only JSON-representable values survive: objects such as a `StoppingCriteriaList`
/// or a torch dtype are rejected here with `TypeError`, tuples come back as lists,
/// and `NaN`/`inf` floats are rejected with `ColloquyError`.
#[pyclass(name = "TextEnvironment", module = "pycolloquy", unsendable)]
struct PyTextEnvironment {
    inner: TextEnvironment,
}

#[pymethods]
impl PyTextEnvironment {
    /// `generation_kwargs` must be JSON-representable; see the class docs.
    #[new]
    #[pyo3(signature = (tokenizer, generator, scorer, max_turns=4, observation_width=8, generation_kwargs=None))]
    fn new(
        py: Python<'_>,
        tokenizer: Py<PyAny>,
        generator: Py<PyAny>,
        scorer: Py<PyAny>,
        max_turns: usize,
        observation_width: usize,
        generation_kwargs: Option<Bound<'_, PyDict>>,
    ) -> PyResult<Self> {
        let kwargs_json = match generation_kwargs {
            Some(kwargs) => Some(
                py.import("json")?
                    .call_method1("dumps", (kwargs,))?
                    .extract::<String>()?,
            ),
            None => None,
        };
        let config = crate::config_from_kwargs(max_turns, observation_width, kwargs_json.as_deref())
            .map_err(to_py_err)?;

        let inner = TextEnvironment::new(
            PyTokenizer::new(py, tokenizer)?,
            PyGenerator { inner: generator },
            PyScorer { inner: scorer },
            config,
        )
        .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Returns `(observation, mask)`.
    fn reset(&mut self) -> (Vec<TokenId>, Vec<u32>) {
        observation_parts(self.inner.reset())
    }

    /// Returns `(observation, reward, done, info)`; `info["mask"]` is the role mask.
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        query: &Bound<'py, PyAny>,
    ) -> PyResult<(Vec<TokenId>, f32, bool, Bound<'py, PyDict>)> {
        if query.is_none() {
            return Err(to_py_err(EnvError::InvalidInput(
                "query is None".to_string(),
            )));
        }
        let text = query
            .str()
            .and_then(|s| s.extract::<String>())
            .map_err(|e| to_py_err(EnvError::InvalidInput(e.to_string())))?;

        let (obs, reward, done, info) = self.inner.step(&text).map_err(to_py_err)?;
        let (tokens, mask) = observation_parts(obs);

        let dict = PyDict::new(py);
        dict.set_item("mask", mask)?;
        dict.set_item("turn", info.turn)?;
        dict.set_item("episode_id", info.episode_id.to_string())?;
        dict.set_item("response", info.response)?;
        Ok((tokens, reward, done, dict))
    }

    #[getter]
    fn turn(&self) -> usize {
        self.inner.turn()
    }

    #[getter]
    fn max_turns(&self) -> usize {
        self.inner.max_turns()
    }

    #[getter]
    fn done(&self) -> bool {
        self.inner.is_done()
    }

    #[getter]
    fn last_response(&self) -> PyResult<String> {
        self.inner
            .history()
            .last_segment_text()
            .map(str::to_string)
            .map_err(|e| to_py_err(e.into()))
    }
}

/// Installs a `tracing` subscriber writing to stderr, e.g. `init_logging("colloquy=debug")`.
#[pyfunction]
#[pyo3(signature = (filter="info"))]
fn init_logging(filter: &str) -> PyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| ColloquyError::new_err(e.to_string()))
}

/// The name of this function must match the lib.name in Cargo.toml
#[pymodule]
fn pycolloquy(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTextEnvironment>()?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add("ColloquyError", m.py().get_type::<ColloquyError>())?;
    Ok(())
}
