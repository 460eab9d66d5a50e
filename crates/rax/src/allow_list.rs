//! Static table of the fields extracted from each interaction kind.
//!
//! Only the fields listed for a kind ever reach the evaluator; everything else
//! an interaction carries is dropped. Kinds missing from the table extract
//! nothing.

use serde_json::{Number, Value as Json};

use crate::interaction::EventData;

/// A semantic field that may be read off an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Field {
    AltKey,
    AnimationName,
    Button,
    ChangedTouches,
    ClientX,
    ClientY,
    ClipboardData,
    Code,
    CtrlKey,
    CurrentTime,
    Data,
    DataTransfer,
    DeltaMode,
    DeltaX,
    DeltaY,
    DeltaZ,
    ElapsedTime,
    InnerHeight,
    InnerWidth,
    InputType,
    Key,
    KeyCode,
    MetaKey,
    MovementX,
    MovementY,
    Muted,
    PropertyName,
    RelatedTarget,
    Repeat,
    ScrollX,
    ScrollY,
    ShiftKey,
    TargetTouches,
    Touches,
    Value,
    Volume,
}

use Field::*;

/// Nothing beyond the kind itself.
const NONE: &[Field] = &[];
/// Animation and transition timing.
const ANIMATION: &[Field] = &[AnimationName, ElapsedTime];
/// Focus changes.
const FOCUS: &[Field] = &[RelatedTarget];
/// Pointer presses and clicks.
const POINTER_BUTTON: &[Field] = &[AltKey, Button, ClientX, ClientY, CtrlKey, MetaKey, ShiftKey];
/// Context menu requests.
const CONTEXT_MENU: &[Field] = &[Button, ClientX, ClientY];
/// Clipboard transfers.
const CLIPBOARD: &[Field] = &[ClipboardData];
/// Drag and drop.
const DRAG: &[Field] = &[ClientX, ClientY, DataTransfer];
/// Text input.
const INPUT: &[Field] = &[Data, InputType];
/// Key press with auto-repeat flag.
const KEY_DOWN: &[Field] = &[AltKey, Code, CtrlKey, Key, KeyCode, MetaKey, Repeat, ShiftKey];
/// Key press and release.
const KEY: &[Field] = &[AltKey, Code, CtrlKey, Key, KeyCode, MetaKey, ShiftKey];
/// Pointer entering or leaving.
const POINTER_CROSSING: &[Field] = &[ClientX, ClientY];
/// Pointer moving over or out with the element it came from.
const POINTER_OVER: &[Field] = &[ClientX, ClientY, RelatedTarget];
/// Pointer motion.
const POINTER_MOVE: &[Field] = &[
    AltKey, ClientX, ClientY, CtrlKey, MetaKey, MovementX, MovementY, ShiftKey,
];
/// Window resize.
const RESIZE: &[Field] = &[InnerHeight, InnerWidth];
/// Scrolling.
const SCROLL: &[Field] = &[ScrollX, ScrollY];
/// Media playback position.
const TIME_UPDATE: &[Field] = &[CurrentTime];
/// Touch gestures.
const TOUCH: &[Field] = &[ChangedTouches, TargetTouches, Touches];
/// CSS transition completion.
const TRANSITION: &[Field] = &[ElapsedTime, PropertyName];
/// Media volume.
const VOLUME: &[Field] = &[Muted, Volume];
/// Wheel rotation.
const WHEEL: &[Field] = &[DeltaMode, DeltaX, DeltaY, DeltaZ];

/// Ordered fields extracted for interaction `kind`; empty for unknown kinds.
pub fn fields_for(kind: &str) -> &'static [Field] {
    match kind {
        "animationend" | "animationiteration" | "animationstart" => ANIMATION,
        "blur" | "focus" | "focusin" | "focusout" => FOCUS,
        "change" => &[Value],
        "click" | "dblclick" | "mousedown" | "mouseup" => POINTER_BUTTON,
        "contextmenu" => CONTEXT_MENU,
        "copy" | "cut" | "paste" => CLIPBOARD,
        "drag" | "dragend" | "dragenter" | "dragleave" | "dragover" | "dragstart" | "drop" => DRAG,
        "input" => INPUT,
        "keydown" => KEY_DOWN,
        "keypress" | "keyup" => KEY,
        "mouseenter" | "mouseleave" => POINTER_CROSSING,
        "mousemove" => POINTER_MOVE,
        "mouseout" | "mouseover" => POINTER_OVER,
        "resize" => RESIZE,
        "scroll" => SCROLL,
        "timeupdate" => TIME_UPDATE,
        "touchcancel" | "touchend" | "touchmove" | "touchstart" => TOUCH,
        "transitionend" => TRANSITION,
        "volumechange" => VOLUME,
        "wheel" => WHEEL,
        // Lifecycle, media and form kinds carry no fields: beforeunload, ended, load,
        // pause, play, reset, select, submit, unload.
        _ => NONE,
    }
}

/// Render a float the way the evaluator's JSON reader expects: integral values as integers,
/// non-finite values as `null`.
fn number(v: f64) -> Json {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if !v.is_finite() {
        return Json::Null;
    }
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE {
        return Json::from(v as i64);
    }
    Number::from_f64(v).map_or(Json::Null, Json::Number)
}

impl Field {
    /// Name of the field in the serialized payload.
    pub fn name(self) -> &'static str {
        match self {
            AltKey => "altKey",
            AnimationName => "animationName",
            Button => "button",
            ChangedTouches => "changedTouches",
            ClientX => "clientX",
            ClientY => "clientY",
            ClipboardData => "clipboardData",
            Code => "code",
            CtrlKey => "ctrlKey",
            CurrentTime => "currentTime",
            Data => "data",
            DataTransfer => "dataTransfer",
            DeltaMode => "deltaMode",
            DeltaX => "deltaX",
            DeltaY => "deltaY",
            DeltaZ => "deltaZ",
            ElapsedTime => "elapsedTime",
            InnerHeight => "innerHeight",
            InnerWidth => "innerWidth",
            InputType => "inputType",
            Key => "key",
            KeyCode => "keyCode",
            MetaKey => "metaKey",
            MovementX => "movementX",
            MovementY => "movementY",
            Muted => "muted",
            PropertyName => "propertyName",
            RelatedTarget => "relatedTarget",
            Repeat => "repeat",
            ScrollX => "scrollX",
            ScrollY => "scrollY",
            ShiftKey => "shiftKey",
            TargetTouches => "targetTouches",
            Touches => "touches",
            Value => "value",
            Volume => "volume",
        }
    }

    /// Read this field off `data`; `None` when the interaction does not carry it.
    pub fn read(self, data: &EventData) -> Option<Json> {
        let text = |s: &Option<String>| s.clone().map(Json::String);
        let flag = |b: Option<bool>| b.map(Json::Bool);
        let num = |n: Option<f64>| n.map(number);
        match self {
            AltKey => flag(data.alt_key),
            AnimationName => text(&data.animation_name),
            Button => data.button.map(Json::from),
            ChangedTouches => data.changed_touches.clone(),
            ClientX => num(data.client_x),
            ClientY => num(data.client_y),
            ClipboardData => data.clipboard_data.clone(),
            Code => text(&data.code),
            CtrlKey => flag(data.ctrl_key),
            CurrentTime => num(data.current_time),
            Data => text(&data.data),
            DataTransfer => data.data_transfer.clone(),
            DeltaMode => data.delta_mode.map(Json::from),
            DeltaX => num(data.delta_x),
            DeltaY => num(data.delta_y),
            DeltaZ => num(data.delta_z),
            ElapsedTime => num(data.elapsed_time),
            InnerHeight => num(data.inner_height),
            InnerWidth => num(data.inner_width),
            InputType => text(&data.input_type),
            Key => text(&data.key),
            KeyCode => data.key_code.map(Json::from),
            MetaKey => flag(data.meta_key),
            MovementX => num(data.movement_x),
            MovementY => num(data.movement_y),
            Muted => flag(data.muted),
            PropertyName => text(&data.property_name),
            RelatedTarget => data.related_target.clone(),
            Repeat => flag(data.repeat),
            ScrollX => num(data.scroll_x),
            ScrollY => num(data.scroll_y),
            ShiftKey => flag(data.shift_key),
            TargetTouches => data.target_touches.clone(),
            Touches => data.touches.clone(),
            Value => text(&data.value),
            Volume => num(data.volume),
        }
    }
}
