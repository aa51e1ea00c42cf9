//! Python bindings for the policy file codec using PyO3.
//!
//! Exposes a `PolicyRecord` class and `load`/`loads`/`dump`/`dumps`
//! functions shaped like Python's `json` module.

use pyo3::exceptions::{PyFileExistsError, PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::{decode, encode, write_file, PolicyError, PolicyFile, WriteMode};
use crate::{PolicyRecord as RustPolicyRecord, RegistryValueKind, ValueData};

/// Convert Rust PolicyError to Python exception
fn policy_error_to_py(err: PolicyError) -> PyErr {
    match err {
        PolicyError::Io(e) => PyIOError::new_err(e.to_string()),

        PolicyError::PathConflict(path) => {
            PyFileExistsError::new_err(path.display().to_string())
        }

        other => PyValueError::new_err(other.to_string()),
    }
}

/// Accepts either a wire code (`4`) or a name (`"REG_DWORD"`, `"dword"`).
fn kind_from_py(value: &PyAny) -> PyResult<RegistryValueKind> {
    if let Ok(code) = value.extract::<i32>() {
        return RegistryValueKind::from_code(code, 0).map_err(policy_error_to_py);
    }

    let name: &str = value.extract()?;
    name.parse()
        .map_err(|e: crate::kind::UnknownKindName| PyValueError::new_err(e.to_string()))
}

/// Converts a Python object into the payload shape `kind` expects.
fn data_from_py(kind: RegistryValueKind, value: Option<&PyAny>) -> PyResult<ValueData> {
    let value = match value {
        Some(v) if !v.is_none() => v,
        _ => return Ok(ValueData::None),
    };

    match kind {
        RegistryValueKind::String | RegistryValueKind::ExpandString => {
            Ok(ValueData::String(value.extract()?))
        }
        RegistryValueKind::MultiString => Ok(ValueData::MultiString(value.extract()?)),
        RegistryValueKind::Dword => {
            // Accept both signed and unsigned 32-bit spellings.
            let raw: i64 = value.extract()?;
            let dword = i32::try_from(raw)
                .or_else(|_| u32::try_from(raw).map(|u| u as i32))
                .map_err(|_| PyValueError::new_err(format!("{} does not fit a DWORD", raw)))?;
            Ok(ValueData::Dword(dword))
        }
        RegistryValueKind::Qword => Ok(ValueData::Qword(value.extract()?)),
        _ => {
            let bytes = value.downcast::<PyBytes>()?;
            Ok(ValueData::Binary(bytes.as_bytes().to_vec()))
        }
    }
}

/// Python wrapper for PolicyRecord
#[pyclass(name = "PolicyRecord")]
#[derive(Clone)]
pub struct PyPolicyRecord {
    inner: RustPolicyRecord,
}

#[pymethods]
impl PyPolicyRecord {
    #[new]
    #[pyo3(signature = (key_name, value_name, value_type, value_data = None))]
    fn new(
        key_name: String,
        value_name: String,
        value_type: &PyAny,
        value_data: Option<&PyAny>,
    ) -> PyResult<Self> {
        let kind = kind_from_py(value_type)?;
        let data = data_from_py(kind, value_data)?;
        let inner = RustPolicyRecord::new(key_name, value_name, kind, data)
            .map_err(policy_error_to_py)?;
        Ok(Self { inner })
    }

    /// Get the key name
    #[getter]
    fn key_name(&self) -> &str {
        self.inner.key_name()
    }

    /// Get the value name
    #[getter]
    fn value_name(&self) -> &str {
        self.inner.value_name()
    }

    /// Get the type name as string (e.g., "REG_SZ", "REG_DWORD")
    #[getter]
    fn value_type(&self) -> &'static str {
        self.inner.value_type().name()
    }

    /// Get the numeric type code
    #[getter]
    fn value_type_code(&self) -> i32 {
        self.inner.value_type().code()
    }

    /// Get the declared data length in bytes
    #[getter]
    fn value_length(&self) -> u32 {
        self.inner.value_length()
    }

    /// Get the value data as the matching Python type
    #[getter]
    fn value_data(&self, py: Python) -> PyObject {
        match self.inner.value_data() {
            ValueData::None => py.None(),
            ValueData::String(s) => s.as_str().into_py(py),
            ValueData::MultiString(items) => items.clone().into_py(py),
            ValueData::Binary(b) => PyBytes::new(py, b).into_py(py),
            ValueData::Dword(d) => (*d).into_py(py),
            ValueData::Qword(q) => (*q).into_py(py),
        }
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.inner == other.inner
    }

    fn __repr__(&self) -> String {
        format!(
            "PolicyRecord(key_name='{}', value_name='{}', value_type={})",
            self.inner.key_name(),
            self.inner.value_name(),
            self.inner.value_type()
        )
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

fn wrap_records(records: Vec<RustPolicyRecord>) -> Vec<PyPolicyRecord> {
    records.into_iter().map(|inner| PyPolicyRecord { inner }).collect()
}

fn unwrap_records(records: Vec<PyPolicyRecord>) -> Vec<RustPolicyRecord> {
    records.into_iter().map(|r| r.inner).collect()
}

/// Read and decode a policy file
#[pyfunction]
fn load(path: &str, py: Python) -> PyResult<Vec<PyPolicyRecord>> {
    // Release GIL during file I/O and parsing
    let file = py
        .allow_threads(|| PolicyFile::open(path))
        .map_err(policy_error_to_py)?;
    Ok(wrap_records(file.into_records()))
}

/// Decode a policy file image
#[pyfunction]
fn loads(data: &[u8]) -> PyResult<Vec<PyPolicyRecord>> {
    let (records, _consumed) = decode(data).map_err(policy_error_to_py)?;
    Ok(wrap_records(records))
}

/// Encode records into a policy file image
#[pyfunction]
fn dumps<'py>(py: Python<'py>, records: Vec<PyPolicyRecord>) -> PyResult<&'py PyBytes> {
    let bytes = encode(&unwrap_records(records)).map_err(policy_error_to_py)?;
    Ok(PyBytes::new(py, &bytes))
}

/// Encode records and write them to a file
#[pyfunction]
#[pyo3(signature = (path, records, overwrite = false))]
fn dump(py: Python, path: &str, records: Vec<PyPolicyRecord>, overwrite: bool) -> PyResult<()> {
    let records = unwrap_records(records);
    let mode = if overwrite {
        WriteMode::Overwrite
    } else {
        WriteMode::CreateNew
    };

    // Release GIL during file I/O
    py.allow_threads(|| write_file(path, &records, mode))
        .map_err(policy_error_to_py)
}

/// Python module definition
#[pymodule]
fn reg_pol(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyPolicyRecord>()?;
    m.add_function(wrap_pyfunction!(load, m)?)?;
    m.add_function(wrap_pyfunction!(loads, m)?)?;
    m.add_function(wrap_pyfunction!(dump, m)?)?;
    m.add_function(wrap_pyfunction!(dumps, m)?)?;

    // Add version constant
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
