use crate::game_logic::{BOOST_SPEED_BONUS, BOOST_SPEED_CAP, Car, ControlState, FRICTION};

/// Apply one tick of control input to a car's speed, boost and heading.
/// Position is left alone; see [`integrate_position`].
pub fn apply_controls(car: &mut Car, input: &ControlState) {
    // Longitudinal: accelerate wins over brake, otherwise coast down
    if input.accelerate {
        car.speed = (car.speed + car.acceleration).min(car.max_speed);
    } else if input.brake {
        car.speed = (car.speed - car.acceleration).max(-car.max_speed / 2.0);
    } else {
        car.speed *= FRICTION;
    }

    if input.boost && car.boost > 0.0 {
        car.speed = (car.speed + BOOST_SPEED_BONUS).min(car.max_speed * BOOST_SPEED_CAP);
        car.boost -= car.boost_drain;
    } else {
        car.boost += car.boost_recharge;
    }
    car.boost = car.boost.clamp(0.0, car.max_boost);

    if input.turn_left {
        car.angle -= car.turn_rate;
    }
    if input.turn_right {
        car.angle += car.turn_rate;
    }
}

/// Move the car along its heading by its current speed
pub fn integrate_position(car: &mut Car) {
    car.position += car.forward_vector() * car.speed;
}

/// Full player-style physics step: controls then integration
pub fn apply_physics(car: &mut Car) {
    let input = car.controls;
    apply_controls(car, &input);
    integrate_position(car);
}
