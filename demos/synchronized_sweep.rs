//! Synchronized sweep example.
//!
//! Demonstrates loading servo calibration from TOML, moving three servos so
//! that they arrive together, and driving them through PWM pins.
//!
//! The pins print their duty cycle instead of driving hardware.
//!
//! Run with: `cargo run --example synchronized_sweep --features std`

use std::time::Instant;

use heapless::Vec;
use servo_easing::{
    config::parse_config, Degrees, DegreesPerSec, EasingType, MoveRequest, PwmOutput, ServoGroup,
};

const CONFIG: &str = r#"
[servos.pan]
name = "Pan"
channel = 0
easing = "cubic"
call_style = "in_out"

[servos.tilt]
name = "Tilt"
channel = 1
reversed = true
trim = 8
easing = "back"
call_style = "out"

[servos.claw]
name = "Claw"
channel = 2
easing = "bounce"
speed_deg_per_sec = 120.0
"#;

/// Delay provider backed by the OS.
struct StdDelay;

impl embedded_hal::delay::DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

/// PWM channel that logs its duty cycle.
struct ConsolePin {
    channel: u8,
}

impl embedded_hal::pwm::ErrorType for ConsolePin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for ConsolePin {
    fn max_duty_cycle(&self) -> u16 {
        20_000
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        println!("  ch{}: {:>4} us", self.channel, duty);
        Ok(())
    }
}

fn main() -> servo_easing::Result<()> {
    println!("=== Synchronized Sweep Example ===\n");

    let config = parse_config(CONFIG)?;
    let mut group: ServoGroup<3> = ServoGroup::new();
    let pan = group.attach_named(&config, "pan")?;
    let tilt = group.attach_named(&config, "tilt")?;
    let claw = group.attach_named(&config, "claw")?;

    let mut pins: Vec<ConsolePin, 3> = Vec::new();
    for channel in 0..3 {
        let _ = pins.push(ConsolePin { channel });
    }
    let mut output = PwmOutput::new(pins);
    let mut delay = StdDelay;
    let clock = Instant::now();
    let now = || clock.elapsed().as_millis() as u32;

    for report in group.reports() {
        println!("{}", report);
    }

    // Phase 1: explicit requests sharing the longest duration
    println!("\n--- Phase 1: synchronize_group ---");
    let requests = [
        MoveRequest::at_speed(pan, Degrees(20.0), DegreesPerSec(60.0)),
        MoveRequest::at_speed(tilt, Degrees(140.0), DegreesPerSec(90.0)),
        MoveRequest::in_millis(claw, Degrees(0.0), 300),
    ];
    let common = group.synchronize_group(&requests, now())?;
    println!("common duration: {} ms", common);
    let finished = group.update_and_wait_for_all_to_stop(now(), &mut output, &mut delay)?;
    println!("all servos stopped at t = {} ms", finished);

    // Phase 2: next positions at each servo's own speed
    println!("\n--- Phase 2: array positions ---");
    group.set_next_positions(&[Degrees(160.0), Degrees(40.0), Degrees(90.0)]);
    group.synchronize_and_ease_to_array_positions(None, now(), &mut output, &mut delay)?;

    // Phase 3: a single blocking move with a different curve
    println!("\n--- Phase 3: single ease_to ---");
    group.set_easing(pan, EasingType::ELASTIC_OUT)?;
    group.ease_to(pan, Degrees(90.0), DegreesPerSec(45.0), now(), &mut output, &mut delay)?;

    println!();
    for report in group.reports() {
        println!("{}", report);
    }
    println!("\n=== Example Complete ===");
    Ok(())
}
