use charlcd_gpio::gpiod::GpiodDriver;
use charlcd_gpio::lcd::hd44780::charset::glyph;
use charlcd_gpio::lcd::hd44780::{GpioHD44780Driver, HD44780Driver, LcdPins};
use charlcd_gpio::mock::MockGpioDriver;
use charlcd_gpio::{GpioActiveLevel, GpioDriver};
use dotenv::dotenv;
use log::{debug, info};
use std::env::var;

/// Lines of the simulated chip in dry-run mode, enough for any Raspberry Pi header.
const DRY_RUN_LINES: usize = 64;

fn parse_pin_bus<const N: usize>(pin_str: &str) -> eyre::Result<[usize; N]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre::eyre!("Invalid number of data pins, expected {}", N))
}

fn pins_from_env() -> eyre::Result<LcdPins> {
    Ok(LcdPins {
        rs: var("CHARLCD_PIN_RS")?.parse()?,
        rw: var("CHARLCD_PIN_RW")?.parse()?,
        e: var("CHARLCD_PIN_E")?.parse()?,
        data: parse_pin_bus(&var("CHARLCD_PINS_DATA")?)?,
    })
}

fn env_flag(name: &str) -> bool {
    var(name).is_ok_and(|v| !v.is_empty() && v != "0")
}

fn write(gpio: &dyn GpioDriver, pins: LcdPins, text: &str) -> eyre::Result<()> {
    debug!("Initializing LCD driver...");
    let mut lcd = GpioHD44780Driver::new(gpio, pins)?;
    lcd.init()?;
    lcd.write_text(text, false)?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    let pins = pins_from_env()?;
    let text = var("CHARLCD_TEXT").unwrap_or_else(|_| "Hello, World!".to_string());
    let dry_run = env_flag("CHARLCD_DRY_RUN");
    let active_level = if env_flag("CHARLCD_ACTIVE_LOW") {
        GpioActiveLevel::Low
    } else {
        GpioActiveLevel::High
    };

    info!("LCD @ RS: {}, RW: {}, E: {}, Data: {:?}", pins.rs, pins.rw, pins.e, pins.data);

    if dry_run {
        let gpio = MockGpioDriver::new(DRY_RUN_LINES);
        write(&gpio, pins, &text)?;

        for word in gpio.transactions(&pins) {
            match word.as_instruction() {
                Some(instruction) => info!("{:08b} {:?}", word.data, instruction),
                None => info!(
                    "{:08b} data {:?}",
                    word.data,
                    glyph(word.data).unwrap_or('?')
                ),
            }
        }
        return Ok(());
    }

    let chip = var("CHARLCD_GPIO_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
    debug!("Initializing GPIO driver...");
    let gpio = GpiodDriver::open(&chip)?.with_active_level(active_level);
    debug!("{:?} initialized.", gpio);

    write(&gpio, pins, &text)?;
    info!("Wrote {:?}", text);

    Ok(())
}
