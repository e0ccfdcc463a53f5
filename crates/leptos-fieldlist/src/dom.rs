//! DOM Binding
//!
//! Attaches add/remove controls to server-rendered field lists and keeps the
//! row model and the document in step.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use leptos::mount::mount_to;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

use crate::model::{ControlId, ControlIds, ControlSlots, FieldList, FieldListError, RowNode};
use crate::options::FieldListOptions;

/// Class of the element holding a row's remove control
pub const REMOVE_CONTROL_CLASS: &str = "remove-button";
/// Class of the element holding a list's add control
pub const ADD_CONTROL_CLASS: &str = "add-button";

/// Set on containers once a widget is attached
pub const ATTACHED_ATTRIBUTE: &str = "data-field-list-attached";

const IDENT_ATTRIBUTES: [&str; 3] = ["id", "for", "name"];

/// Elements whose identifiers name the row's own fields
const FIELD_SELECTOR: &str = "label[for],input[id],input[name],select[id],select[name],textarea[id],textarea[name]";

/// Widget ordinals stay unique across repeated `attach_all` calls
static NEXT_WIDGET: AtomicUsize = AtomicUsize::new(0);

fn dom_err(value: JsValue) -> FieldListError {
    FieldListError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn elements(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn query_all(root: &Element, selector: &str) -> Result<Vec<Element>, FieldListError> {
    root.query_selector_all(selector).map(elements).map_err(dom_err)
}

/// A `<li>` row in the document
#[derive(Clone, Debug)]
pub struct DomRow {
    element: Element,
}

impl DomRow {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The row itself plus descendants carrying identifiers, controls excluded
    fn identified_elements(&self) -> Vec<Element> {
        let mut found = vec![self.element.clone()];
        found.extend(self.descendants("[id],[for],[name]"));
        found
    }

    fn descendants(&self, selector: &str) -> Vec<Element> {
        let mut found = match query_all(&self.element, selector) {
            Ok(children) => children,
            Err(err) => {
                tracing::warn!("failed to scan row identifiers: {}", err);
                Vec::new()
            }
        };
        found.retain(|el| {
            !matches!(el.closest(&format!(".{}", REMOVE_CONTROL_CLASS)), Ok(Some(_)))
        });
        found
    }
}

impl RowNode for DomRow {
    fn duplicate(&self) -> Result<Self, FieldListError> {
        let copy = self.element.clone_node_with_deep(true).map_err(dom_err)?;
        let element = copy
            .dyn_into::<Element>()
            .map_err(|_| FieldListError::Dom("cloned row is not an element".to_string()))?;
        Ok(Self { element })
    }

    fn strip_controls(&mut self) -> Result<(), FieldListError> {
        for stale in query_all(&self.element, &format!(".{}", REMOVE_CONTROL_CLASS))? {
            stale.remove();
        }
        Ok(())
    }

    fn clear_values(&mut self) -> Result<(), FieldListError> {
        for input in query_all(&self.element, "input")? {
            if let Ok(input) = input.dyn_into::<HtmlInputElement>() {
                match input.type_().as_str() {
                    "checkbox" | "radio" => input.set_checked(false),
                    _ => input.set_value(""),
                }
            }
        }
        for area in query_all(&self.element, "textarea")? {
            if let Ok(area) = area.dyn_into::<HtmlTextAreaElement>() {
                area.set_text_content(Some(""));
                area.set_value("");
            }
        }
        Ok(())
    }

    fn identifiers(&self) -> Vec<String> {
        self.identified_elements()
            .iter()
            .flat_map(|el| IDENT_ATTRIBUTES.iter().filter_map(move |attr| el.get_attribute(attr)))
            .collect()
    }

    fn field_identifiers(&self) -> Vec<String> {
        self.descendants(FIELD_SELECTOR)
            .iter()
            .flat_map(|el| {
                let attrs: &[&str] = if el.tag_name().eq_ignore_ascii_case("label") { &["for"] } else { &["id", "name"] };
                attrs.iter().filter_map(move |attr| el.get_attribute(attr))
            })
            .collect()
    }

    fn rewrite_identifiers(&mut self, rewrite: &dyn Fn(&str) -> Option<String>) {
        for el in self.identified_elements() {
            for attr in IDENT_ATTRIBUTES {
                let Some(value) = el.get_attribute(attr) else { continue };
                if let Some(new_value) = rewrite(&value) {
                    if let Err(err) = el.set_attribute(attr, &new_value) {
                        tracing::warn!("failed to set {}='{}': {}", attr, new_value, dom_err(err));
                    }
                }
            }
        }
    }
}

/// One attached list: the row model, its control ids and the `<ul>` it renders into
struct FieldListWidget {
    list: RefCell<FieldList<DomRow>>,
    controls: RefCell<ControlIds>,
    items: Element,
    options: FieldListOptions,
    /// Unmount handles of the remove controls, by control
    mounted: RefCell<ControlSlots<Box<dyn Any>>>,
}

impl FieldListWidget {
    fn attach(container: &Element, ordinal: usize, options: &FieldListOptions) -> Result<Rc<Self>, FieldListError> {
        let wrapper = container
            .query_selector(".form-control")
            .map_err(dom_err)?
            .ok_or_else(|| FieldListError::Dom("missing .form-control wrapper".to_string()))?;
        let items = wrapper
            .query_selector("ul")
            .map_err(dom_err)?
            .ok_or_else(|| FieldListError::Dom("missing <ul> of rows".to_string()))?;

        let mut controls = ControlIds::new(ordinal);
        let add_control = controls.allocate();
        let rows: Vec<(Element, ControlId)> = query_all(&items, ":scope > li")?
            .into_iter()
            .map(|el| (el, controls.allocate()))
            .collect();

        let list = FieldList::new(
            rows.iter()
                .map(|(el, control)| (DomRow::new(el.clone()), *control))
                .collect(),
        )?;
        tracing::info!(
            "attached field list '{}' with {} rows",
            list.prefix().as_str(),
            list.len()
        );

        let widget = Rc::new(Self {
            list: RefCell::new(list),
            controls: RefCell::new(controls),
            items,
            options: options.clone(),
            mounted: RefCell::new(ControlSlots::default()),
        });

        Self::mount_add_control(&widget, &wrapper, add_control)?;
        for (row, control) in &rows {
            Self::mount_remove_control(&widget, row, *control)?;
        }
        Ok(widget)
    }

    fn mount_add_control(widget: &Rc<Self>, wrapper: &Element, control: ControlId) -> Result<(), FieldListError> {
        let holder = create_holder(wrapper, ADD_CONTROL_CLASS)?;
        wrapper.append_child(&holder).map_err(dom_err)?;

        let owner = Rc::clone(widget);
        let label = widget.options.add_text.clone();
        let id = control.to_string();
        // lives as long as the page
        mount_to(holder, move || view! {
            <a id=id on:click=move |_| FieldListWidget::add_row(&owner)>{label}</a>
        })
        .forget();
        Ok(())
    }

    fn mount_remove_control(widget: &Rc<Self>, row: &Element, control: ControlId) -> Result<(), FieldListError> {
        let holder = create_holder(row, REMOVE_CONTROL_CLASS)?;
        row.prepend_with_node_1(&holder).map_err(dom_err)?;

        let owner = Rc::clone(widget);
        let label = widget.options.remove_text.clone();
        let id = control.to_string();
        let handle = mount_to(holder, move || view! {
            <a id=id on:click=move |_| owner.remove_row(control)>{label}</a>
            <br class="cb" />
        });
        widget.mounted.borrow_mut().insert(control, Box::new(handle));
        Ok(())
    }

    fn add_row(widget: &Rc<Self>) {
        let control = widget.controls.borrow_mut().allocate();
        let added = widget.list.borrow_mut().add(control).map(|row| row.element().clone());
        let row = match added {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!("could not add row: {}", err);
                return;
            }
        };
        if let Err(err) = widget.items.append_child(&row) {
            tracing::warn!("could not insert row: {}", dom_err(err));
            return;
        }
        if let Err(err) = Self::mount_remove_control(widget, &row, control) {
            tracing::warn!("could not bind remove control {}: {}", control, err);
        }
    }

    fn remove_row(&self, control: ControlId) {
        let result = self.list.borrow_mut().remove(control);
        match result {
            Ok(row) => {
                row.element().remove();
                if let Some(handle) = self.mounted.borrow_mut().release(control) {
                    // the click handler being run belongs to this handle
                    spawn_local(async move { drop(handle) });
                }
            }
            Err(FieldListError::LastRow) => {
                tracing::warn!("refused to remove the only row of '{}'", self.list.borrow().prefix().as_str());
                alert(&self.options.last_row_message);
            }
            Err(err) => tracing::warn!("could not remove row: {}", err),
        }
    }
}

fn create_holder(near: &Element, class: &str) -> Result<HtmlElement, FieldListError> {
    let document: Document = near
        .owner_document()
        .ok_or_else(|| FieldListError::Dom("element has no owner document".to_string()))?;
    let holder = document.create_element("div").map_err(dom_err)?;
    holder.set_class_name(class);
    holder
        .dyn_into::<HtmlElement>()
        .map_err(|_| FieldListError::Dom("created holder is not an HTML element".to_string()))
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.alert_with_message(message) {
            tracing::warn!("could not show alert: {}", dom_err(err));
        }
    }
}

/// Attach a widget to every container matching `options.container_selector`.
///
/// Containers already attached are left alone; those that cannot be attached
/// are skipped with a warning. Returns the number of widgets attached.
pub fn attach_all(options: &FieldListOptions) -> usize {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::warn!("no document available, field lists not attached");
        return 0;
    };
    let containers = match document.query_selector_all(&options.container_selector) {
        Ok(found) => elements(found),
        Err(err) => {
            tracing::warn!("bad container selector '{}': {}", options.container_selector, dom_err(err));
            return 0;
        }
    };

    let mut attached = 0;
    for container in containers.iter().filter(|c| !c.has_attribute(ATTACHED_ATTRIBUTE)) {
        let ordinal = NEXT_WIDGET.fetch_add(1, Ordering::Relaxed);
        match FieldListWidget::attach(container, ordinal, options) {
            Ok(_) => {
                if let Err(err) = container.set_attribute(ATTACHED_ATTRIBUTE, "") {
                    tracing::warn!("could not mark field list {} attached: {}", ordinal, dom_err(err));
                }
                attached += 1;
            }
            Err(err) => tracing::warn!("skipping field list {}: {}", ordinal, err),
        }
    }
    attached
}

/// Run `attach_all` once the document has been parsed
pub fn attach_when_ready(options: FieldListOptions) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::warn!("no document available, field lists not attached");
        return;
    };
    if document.ready_state() != "loading" {
        attach_all(&options);
        return;
    }
    let on_ready = Closure::<dyn FnMut()>::new(move || {
        attach_all(&options);
    });
    if let Err(err) = document.add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref()) {
        tracing::warn!("could not wait for DOMContentLoaded: {}", dom_err(err));
    }
    on_ready.forget();
}
