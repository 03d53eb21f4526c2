use crate::config::ArtifactConfig;
use crate::error::ServiceError;
use crate::model::pipeline::{LinearPipeline, Pipeline};
use crate::preprocessing::encoding::{EncodedRecord, Feature};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Commits the process-wide ONNX Runtime environment. Call before loading
/// any session.
pub fn init_ort() -> Result<(), ServiceError> {
    ort::init().with_name("salarypred").commit()?;
    Ok(())
}

/// Loads the configured pipeline, picking the backend from the file
/// extension: `.json` is a linear model, anything else is ONNX.
pub fn load_pipeline(config: &ArtifactConfig) -> Result<Arc<dyn Pipeline>, ServiceError> {
    let path = config.pipeline.as_path();
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let pipeline: Arc<dyn Pipeline> = if is_json {
        let pipeline = LinearPipeline::load(path)?;
        tracing::info!(path = %path.display(), "loaded linear pipeline");
        Arc::new(pipeline)
    } else {
        let session = load_model(path, config.intra_threads)?;
        Arc::new(OnnxPipeline::new(session, config.features.clone())?)
    };

    Ok(pipeline)
}

/// Opens the exported pipeline graph with `intra_threads` threads per op.
pub fn load_model(
    model_path: impl AsRef<Path>,
    intra_threads: usize,
) -> Result<Session, ServiceError> {
    let path = model_path.as_ref();
    if !path.exists() {
        return Err(ServiceError::ArtifactNotFound(path.display().to_string()));
    }

    let session = Session::builder()
        .map_err(|e| invalid_model(path, e))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| invalid_model(path, e))?
        .with_intra_threads(intra_threads)
        .map_err(|e| invalid_model(path, e))?
        .commit_from_file(path)
        .map_err(|e| invalid_model(path, e))?;

    tracing::info!(path = %path.display(), "loaded ONNX pipeline");
    for (i, input) in session.inputs.iter().enumerate() {
        tracing::debug!(index = i, name = %input.name, kind = ?input.input_type, "pipeline input");
    }

    Ok(session)
}

fn invalid_model(path: &Path, e: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidArtifact(format!("{}: {}", path.display(), e))
}

/// Exported scikit-learn pipeline run through ONNX Runtime.
///
/// A graph with one input takes a `[1, n]` row in `features` order; a graph
/// with several inputs takes one `[1, 1]` tensor per column, matched by name.
pub struct OnnxPipeline {
    // Session::run needs `&mut self`; predictions on one session are serialized.
    session: Mutex<Session>,
    inputs: Vec<(String, TensorElementType)>,
    features: Vec<String>,
}

impl OnnxPipeline {
    pub fn new(session: Session, features: Vec<String>) -> Result<Self, ServiceError> {
        let mut inputs = Vec::with_capacity(session.inputs.len());
        for input in &session.inputs {
            match &input.input_type {
                ValueType::Tensor { ty, .. } => inputs.push((input.name.clone(), *ty)),
                other => {
                    return Err(ServiceError::InvalidArtifact(format!(
                        "pipeline input '{}' is not a tensor: {:?}",
                        input.name, other
                    )))
                }
            }
        }
        if inputs.is_empty() {
            return Err(ServiceError::InvalidArtifact(
                "pipeline declares no inputs".to_string(),
            ));
        }

        Ok(Self {
            session: Mutex::new(session),
            inputs,
            features,
        })
    }
}

impl Pipeline for OnnxPipeline {
    fn predict(&self, record: &EncodedRecord) -> Result<f64, ServiceError> {
        let inputs = assemble_inputs(&self.inputs, &self.features, record)?
            .into_iter()
            .map(InputTensor::into_value)
            .collect::<Result<Vec<_>, _>>()?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ServiceError::Inference(format!("session lock poisoned: {}", e)))?;
        let outputs = session.run(inputs)?;

        let (_name, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| ServiceError::Inference("pipeline produced no output".to_string()))?;

        let value = match output.try_extract_tensor::<f32>() {
            Ok((shape, data)) => first_value(shape, data)?,
            Err(_) => {
                let (shape, data) = output.try_extract_tensor::<f64>()?;
                first_value(shape, data)?
            }
        };

        value.ok_or_else(|| {
            ServiceError::Inference("pipeline returned an empty tensor".to_string())
        })
    }
}

/// Typed values for one graph input, before they become an ORT tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum InputData {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int64(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    pub name: String,
    pub data: InputData,
}

impl InputTensor {
    fn into_value(self) -> Result<(String, DynValue), ServiceError> {
        let value = match self.data {
            InputData::Float32(data) => {
                Tensor::from_array((vec![1i64, data.len() as i64], data))?.into_dyn()
            }
            InputData::Float64(data) => {
                Tensor::from_array((vec![1i64, data.len() as i64], data))?.into_dyn()
            }
            InputData::Int64(data) => {
                Tensor::from_array((vec![1i64, data.len() as i64], data))?.into_dyn()
            }
        };
        Ok((self.name, value))
    }
}

/// Lays the record out for the graph's declared inputs.
///
/// One input: a single row in `features` order, and every record column must
/// be a known feature. Several inputs: one value per input, looked up by name.
pub fn assemble_inputs(
    inputs: &[(String, TensorElementType)],
    features: &[String],
    record: &EncodedRecord,
) -> Result<Vec<InputTensor>, ServiceError> {
    if let [(name, ty)] = inputs {
        let unseen = record
            .columns()
            .find(|c| !features.iter().any(|f| f.as_str() == *c));
        if let Some(extra) = unseen {
            return Err(ServiceError::Inference(format!(
                "Feature '{}' was not seen during fit",
                extra
            )));
        }
        let row = features
            .iter()
            .map(|column| Ok((column.as_str(), feature(record, column)?)))
            .collect::<Result<Vec<_>, ServiceError>>()?;
        return Ok(vec![InputTensor {
            name: name.clone(),
            data: input_data(*ty, &row)?,
        }]);
    }

    inputs
        .iter()
        .map(|(name, ty)| {
            let value = feature(record, name)?;
            Ok(InputTensor {
                name: name.clone(),
                data: input_data(*ty, &[(name.as_str(), value)])?,
            })
        })
        .collect()
}

fn feature<'a>(record: &'a EncodedRecord, column: &str) -> Result<&'a Feature, ServiceError> {
    record
        .get(column)
        .ok_or_else(|| ServiceError::Inference(format!("columns are missing: {{'{}'}}", column)))
}

fn input_data(ty: TensorElementType, row: &[(&str, &Feature)]) -> Result<InputData, ServiceError> {
    let data = match ty {
        TensorElementType::Float32 => {
            InputData::Float32(row.iter().map(|(_, f)| f.as_f64() as f32).collect())
        }
        TensorElementType::Float64 => {
            InputData::Float64(row.iter().map(|(_, f)| f.as_f64()).collect())
        }
        TensorElementType::Int64 => InputData::Int64(
            row.iter()
                .map(|(column, f)| {
                    f.as_i64().ok_or_else(|| ServiceError::InvalidNumber {
                        column: column.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(ServiceError::Inference(format!(
                "unsupported pipeline input type {:?}",
                other
            )))
        }
    };
    Ok(data)
}

fn first_value<T: Copy + Into<f64>>(
    shape: &[i64],
    data: &[T],
) -> Result<Option<f64>, ServiceError> {
    let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
    let output = ndarray::ArrayViewD::from_shape(dims.as_slice(), data)?;
    Ok(output.iter().next().map(|&v| v.into()))
}
