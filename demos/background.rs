//! Background inheritance, borders and static history on a live terminal.
//!
//! ```sh
//! cargo run --example background
//! WOLFIE_LOG=1 cargo run --example background   # also writes wolfie.log
//! ```

use std::cell::RefCell;
use std::io::Stdout;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use wolfie_core::dom::{ElementName, NodeId, STATIC_ATTRIBUTE};
use wolfie_core::scheduler::{MicrotaskQueue, RenderScheduler, SchedulerOptions};
use wolfie_core::types::{AlignSelf, BorderStyle, Color, FlexDirection};
use wolfie_core::{Instance, RenderOptions, Result, Styles, init_tracing};

type Shared = Rc<RefCell<Instance<Stdout>>>;

fn element(instance: &Shared, parent: NodeId, name: ElementName, style: Styles) -> Result<NodeId> {
    let mut instance = instance.borrow_mut();
    let scene = instance.scene_mut();
    let node = scene.create_node(name)?;
    scene.set_style(node, style)?;
    scene.append_child(parent, node)?;
    Ok(node)
}

/// A Text element holding one leaf; returns the leaf.
fn text(instance: &Shared, parent: NodeId, style: Styles, value: &str) -> Result<NodeId> {
    let node = element(instance, parent, ElementName::Text, style)?;
    let mut instance = instance.borrow_mut();
    let scene = instance.scene_mut();
    let leaf = scene.create_text_node(value);
    scene.append_child(node, leaf)?;
    Ok(leaf)
}

fn main() -> Result<()> {
    init_tracing();

    let options = RenderOptions::from_env();
    let instance: Shared = Rc::new(RefCell::new(Instance::new(std::io::stdout(), options)?));
    let root = instance.borrow().scene().root();

    let history = element(
        &instance,
        root,
        ElementName::Box,
        Styles::default().with_flex_direction(FlexDirection::Column),
    )?;
    instance
        .borrow_mut()
        .scene_mut()
        .set_attribute(history, STATIC_ATTRIBUTE, true)?;

    let panel = element(
        &instance,
        root,
        ElementName::Box,
        Styles {
            border_style: Some(BorderStyle::Round),
            border_color: Some(Color::CYAN),
            padding_x: Some(1.0),
            background_color: Some(Color::BLUE),
            align_self: Some(AlignSelf::FlexStart),
            ..Default::default()
        },
    )?;
    text(&instance, panel, Styles::default(), "Outer: ")?;
    let inner = element(
        &instance,
        panel,
        ElementName::Box,
        Styles::default().with_background(Color::YELLOW),
    )?;
    let status = text(&instance, inner, Styles::default(), "step 0")?;

    let queue = MicrotaskQueue::new();
    let painter = instance.clone();
    let scheduler = RenderScheduler::new(
        move || {
            let mut instance = painter.borrow_mut();
            let result = instance.calculate_layout().and_then(|()| instance.on_render());
            if let Err(err) = result {
                tracing::error!(%err, "render failed");
            }
        },
        SchedulerOptions {
            queue: Rc::new(queue.clone()),
            ..Default::default()
        },
    );

    scheduler.schedule_render();
    queue.run_until_idle();

    for step in 1..=5 {
        thread::sleep(Duration::from_millis(300));
        {
            let mut instance = instance.borrow_mut();
            let scene = instance.scene_mut();
            scene.set_text_value(status, &format!("step {step}"))?;
        }
        text(
            &instance,
            history,
            Styles {
                color: Some(Color::GREEN),
                ..Default::default()
            },
            &format!("✔ finished step {step}"),
        )?;
        // Several mutations, one paint.
        scheduler.schedule_render();
        scheduler.schedule_render();
        queue.run_until_idle();
    }

    instance.borrow_mut().unmount()
}
