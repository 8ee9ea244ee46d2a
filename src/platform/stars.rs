//! Starfield backdrop and the shooting star scheduler

use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Element;

use super::dom;
use crate::starfield::Starfield;
use crate::tuning::Tuning;

/// Viewport units a shooting star travels along its direction
const TRAVEL: f32 = 160.0;

pub fn mount(tuning: &Tuning) -> Option<()> {
    let body = dom::body()?;
    let field = dom::create("div", "starfield")?;
    let _ = field.set_attribute("aria-hidden", "true");

    let seed = dom::now_ms() as u64;
    let mut starfield = Starfield::new(seed, tuning);
    for star in starfield.stars() {
        let el = dom::create("div", &star.class_name())?;
        dom::set_style(&el, "left", &format!("{:.2}vw", star.position.x));
        dom::set_style(&el, "top", &format!("{:.2}vh", star.position.y));
        dom::set_style(&el, "--twinkle-dur", &format!("{}s", star.twinkle_secs));
        let _ = field.append_child(&el);
    }
    let _ = body.insert_before(&field, body.first_child().as_ref());

    let delay = starfield.first_shot_delay_ms();
    schedule(Rc::new(RefCell::new(starfield)), field, delay);
    Some(())
}

fn schedule(starfield: Rc<RefCell<Starfield>>, field: Element, delay_ms: f64) {
    dom::set_timeout(delay_ms, move || {
        let (shot, next) = {
            let mut sf = starfield.borrow_mut();
            (sf.shoot(), sf.next_shot_delay_ms())
        };
        if let Some(el) = dom::create("div", "shooting-star") {
            let travel = shot.direction() * TRAVEL;
            dom::set_style(&el, "left", &format!("{:.2}vw", shot.position.x));
            dom::set_style(&el, "top", &format!("{:.2}vh", shot.position.y));
            dom::set_style(&el, "--angle", &format!("{:.1}deg", shot.angle_deg));
            dom::set_style(&el, "--shoot-dur", &format!("{}s", shot.duration_secs));
            dom::set_style(&el, "--dx", &format!("{:.2}vw", travel.x));
            dom::set_style(&el, "--dy", &format!("{:.2}vh", travel.y));
            let _ = field.append_child(&el);
            dom::set_timeout(shot.lifetime_ms(), move || el.remove());
        }
        schedule(starfield, field, next);
    });
}
