//! WASM bindings for the queue module.
//!
//! Wraps [`Sequencer`] for JavaScript: the queue is built from an array whose
//! entries are functions (actions) or nested arrays (branches), and actions
//! are called with the supplied `this` and argument list.

use js_sys::{Array, Function};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::{ActionError, QueueError, QueueResult};
use super::model::{Action, Route, Slot};
use super::sequencer::Sequencer;
use super::shared::SharedSequencer;

type JsSlot = Slot<JsValue, JsValue>;

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<QueueError> for JsValue {
    fn from(err: QueueError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: QueueError| JsValue::from(e))
    };
}

/// Describes a thrown JS value as an action error.
fn action_error(thrown: JsValue) -> ActionError {
    let message = thrown
        .as_string()
        .or_else(|| {
            thrown
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", thrown));
    ActionError::from(message)
}

// =============================================================================
// SLOT CONVERSION
// =============================================================================

const BAD_ENTRY: &str = "queue entries must be functions or arrays of queue entries";

/// What a host value stands for in a queue definition.
enum Entry<V, F> {
    List(Vec<V>),
    Callable(F),
    Other,
}

/// Builds a slot from a host value: lists become branches, callables become
/// actions and anything else is rejected.
fn build_slot<V, F, C, A>(
    value: V,
    read: &impl Fn(V) -> Entry<V, F>,
    wrap: &impl Fn(F) -> Action<C, A>,
) -> Result<Slot<C, A>, &'static str> {
    match read(value) {
        Entry::List(items) => items
            .into_iter()
            .map(|item| build_slot(item, read, wrap))
            .collect::<Result<Vec<_>, _>>()
            .map(Slot::Branch),
        Entry::Callable(f) => Ok(Slot::Action(wrap(f))),
        Entry::Other => Err(BAD_ENTRY),
    }
}

fn read_js(value: JsValue) -> Entry<JsValue, Function> {
    if Array::is_array(&value) {
        return Entry::List(value.unchecked_into::<Array>().to_vec());
    }
    match value.dyn_into::<Function>() {
        Ok(function) => Entry::Callable(function),
        Err(_) => Entry::Other,
    }
}

/// Calls `function` with `this` set to the context and the arguments spread.
fn js_action(function: Function) -> Action<JsValue, JsValue> {
    Action::new(move |this: &JsValue, args: &[JsValue]| {
        let argv = Array::new();
        for arg in args {
            argv.push(arg);
        }
        function.apply(this, &argv).map(|_| ()).map_err(action_error)
    })
}

fn slot_from_js(value: JsValue) -> Result<JsSlot, JsValue> {
    build_slot(value, &read_js, &js_action).map_err(JsValue::from_str)
}

fn slots_from_js(array: &Array) -> Result<Vec<JsSlot>, JsValue> {
    array.iter().map(slot_from_js).collect()
}

/// Arguments handed to a bound callback: an array is spread, a missing value
/// means none, anything else is a single argument.
fn js_args(args: JsValue) -> Vec<JsValue> {
    if Array::is_array(&args) {
        args.unchecked_into::<Array>().to_vec()
    } else if args.is_undefined() || args.is_null() {
        Vec::new()
    } else {
        vec![args]
    }
}

/// Exposes a bound queue operation as a JS function `(context, args)`.
fn bound_function(callback: impl Fn(&JsValue, &[JsValue]) -> QueueResult<()> + 'static) -> Function {
    let closure = Closure::wrap(Box::new(move |context: JsValue, args: JsValue| {
        js_result!(callback(&context, &js_args(args)))
    }) as Box<dyn Fn(JsValue, JsValue) -> Result<(), JsValue>>);
    closure.into_js_value().unchecked_into()
}

/// Applies `Math.round(n) || 1`: fractions round half up, and zero, NaN or a
/// missing count skip a single slot.
fn js_skip_count(count: Option<f64>) -> isize {
    let rounded = count.map(|n| (n + 0.5).floor()).unwrap_or(f64::NAN);
    if rounded.is_nan() || rounded == 0.0 {
        1
    } else {
        rounded as isize
    }
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around a shared Sequencer.
///
/// Every method takes `&self` and the queue is not borrowed while an action
/// runs, so an action may call back into the queue it belongs to.
#[wasm_bindgen]
pub struct JsSequencer {
    inner: SharedSequencer<JsValue, JsValue>,
}

#[wasm_bindgen]
impl JsSequencer {
    /// Creates a queue from an array of functions and nested arrays.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const queue = new JsSequencer([intro, [verse, chorus], outro]);
    /// button.onclick = (event) => queue.runNext(button, [event]);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(slots: Array) -> Result<JsSequencer, JsValue> {
        Ok(JsSequencer {
            inner: Sequencer::new(slots_from_js(&slots)?).into_shared(),
        })
    }

    /// Appends a function or a nested array to the root list.
    pub fn push(&self, slot: JsValue) -> Result<usize, JsValue> {
        let slot = slot_from_js(slot)?;
        Ok(self.inner.update(|queue| {
            queue.push(slot);
            queue.len()
        }))
    }

    /// Number of slots in the root list.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.update(|queue| queue.len())
    }

    /// Invokes the next action with `this` set to `context`.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// queue.advance(null, ['first', 'call']);
    /// ```
    pub fn advance(&self, context: JsValue, args: Option<Array>) -> Result<(), JsValue> {
        let args: Vec<JsValue> = args.map(|a| a.to_vec()).unwrap_or_default();
        js_result!(self.inner.advance(&context, &args))
    }

    /// Moves one slot forward, then invokes the next action.
    #[wasm_bindgen(js_name = runNext)]
    pub fn run_next(&self, context: JsValue, args: Option<Array>) -> Result<(), JsValue> {
        let args: Vec<JsValue> = args.map(|a| a.to_vec()).unwrap_or_default();
        js_result!(self.inner.run_next(&context, &args))
    }

    /// Function bound to this queue that behaves like `advance`.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const start = queue.advanceCallback();
    /// start(null, ['first']);
    /// ```
    #[wasm_bindgen(js_name = advanceCallback)]
    pub fn advance_callback(&self) -> Function {
        bound_function(self.inner.advance_callback())
    }

    /// Function bound to this queue that behaves like `runNext`.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const queue = new JsSequencer([]);
    /// const next = queue.runNextCallback();
    /// queue.push(() => next());
    /// queue.push(done);
    /// ```
    #[wasm_bindgen(js_name = runNextCallback)]
    pub fn run_next_callback(&self) -> Function {
        bound_function(self.inner.run_next_callback())
    }
}

// =============================================================================
// NAVIGATION METHODS
// =============================================================================

#[wasm_bindgen]
impl JsSequencer {
    /// Enters the nested array under the cursor.
    pub fn descend(&self) -> Result<(), JsValue> {
        js_result!(self.inner.update(|queue| queue.descend().map(|_| ())))
    }

    /// Returns to the position the last descent started from.
    pub fn ascend(&self) {
        self.inner.update(|queue| {
            queue.ascend();
        });
    }

    /// Moves the cursor back to the first root entry.
    pub fn reset(&self) {
        self.inner.update(|queue| {
            queue.reset();
        });
    }

    /// Skips `count` entries (rounded; 0, NaN or nothing skip one).
    ///
    /// # Example (JavaScript)
    /// ```js
    /// queue.skip(2);
    /// queue.advance(null, []);
    /// ```
    pub fn skip(&self, count: Option<f64>) {
        let count = js_skip_count(count);
        self.inner.update(|queue| {
            queue.skip(count);
        });
    }

    /// Moves the cursor to an index or along an array of indices.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// queue.gotoPath([1, 1, 0], true);
    /// ```
    #[wasm_bindgen(js_name = gotoPath)]
    pub fn goto_path(&self, path: JsValue, from_root: Option<bool>) -> Result<(), JsValue> {
        let route: Route = from_value(path)?;
        let from_root = from_root.unwrap_or(false);
        js_result!(self
            .inner
            .update(|queue| queue.goto_path(route, from_root).map(|_| ())))
    }

    /// Returns `{ path, index }`, or null while the cursor is detached.
    pub fn position(&self) -> Result<JsValue, JsValue> {
        match self.inner.position() {
            Some(position) => Ok(to_value(&position)?),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn depth(&self) -> usize {
        self.inner.update(|queue| queue.depth())
    }

    #[wasm_bindgen(js_name = isDetached)]
    pub fn is_detached(&self) -> bool {
        self.inner.update(|queue| queue.is_detached())
    }
}
