use clap::{Parser, Subcommand};
use core::fmt::Debug;
use ds2432::{Ds2432, Ds2432Result, Secret};
use embedded_hal::delay::DelayNs;
use embedded_onewire::OneWire;
use std::process::ExitCode;

/// Read, write and provision a DS2432 through a DS2484 bridge
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// ROM code of the DS2432 in hex; read from the bus if there is a single device
    #[arg(short, long, value_parser = parse_hex_u64)]
    rom: Option<u64>,
    /// Secret of the DS2432, 8 bytes in hex
    #[arg(short, long, value_parser = parse_secret, default_value = "0000000000000000")]
    secret: Secret,
    /// Talk to the device at overdrive speed
    #[arg(short, long)]
    overdrive: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump data memory
    Read {
        /// Start address in hex
        #[arg(short, long, value_parser = parse_hex_u16, default_value = "0")]
        address: u16,
        /// Number of bytes
        #[arg(short, long, default_value_t = 128)]
        len: usize,
    },
    /// Write whole 8-byte blocks with authenticated copies
    Write {
        /// Block aligned start address in hex
        #[arg(short, long, value_parser = parse_hex_u16)]
        address: u16,
        /// Data in hex, a multiple of 8 bytes
        #[arg(value_parser = parse_bytes)]
        data: ::std::vec::Vec<u8>, // one argument, not a list
    },
    /// Load a new secret into the device
    Provision {
        /// New secret, 8 bytes in hex
        #[arg(value_parser = parse_secret)]
        secret: Secret,
    },
    /// Show the register page
    Registers,
}

fn parse_hex_u64(input: &str) -> Result<u64, std::num::ParseIntError> {
    u64::from_str_radix(input.trim_start_matches("0x"), 16)
}

fn parse_hex_u16(input: &str) -> Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(input.trim_start_matches("0x"), 16)
}

fn parse_bytes(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(input.trim_start_matches("0x"))
}

fn parse_secret(input: &str) -> Result<Secret, String> {
    let bytes = parse_bytes(input).map_err(|e| e.to_string())?;
    let bytes: [u8; 8] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("secret is 8 bytes, got {}", b.len()))?;
    Ok(Secret::new(bytes))
}

fn run<O, D>(bus: &mut O, delay: &mut D, args: Args) -> Ds2432Result<(), O::BusError>
where
    O: OneWire,
    O::BusError: Debug,
    D: DelayNs,
{
    let rom = match args.rom {
        Some(rom) => rom,
        None => bus.read_rom()?,
    };
    if args.overdrive {
        bus.set_overdrive_mode(true)?;
    }
    let mut dev = Ds2432::new(rom).with_secret(args.secret);
    log::info!("DS2432 {:016x}", dev.rom());
    match args.command {
        Command::Read { address, len } => {
            let mut buf = vec![0; len];
            let read = dev.read(bus, address, &mut buf)?;
            for (i, line) in buf[..read].chunks(16).enumerate() {
                println!("{:04x}: {}", address as usize + i * 16, hex::encode(line));
            }
        }
        Command::Write { address, data } => {
            dev.write(bus, delay, address, &data)?;
            log::info!("wrote {} bytes at {:04x}", data.len(), address);
        }
        Command::Provision { secret } => {
            dev.write_secret(bus, delay, secret)?;
            log::info!("secret loaded");
        }
        Command::Registers => {
            let page = dev.read_register_page(bus)?;
            println!("register page:         {}", hex::encode(page.0));
            println!("secret write protect:  {}", page.secret_write_protected());
            println!("pages write protect:   {}", page.pages_write_protected());
            println!("page 0 write protect:  {}", page.page0_write_protected());
            println!("page 1 EPROM mode:     {}", page.page1_eprom_mode());
            println!("user byte:             {:02x}", page.user_byte());
            println!("factory byte:          {:02x}", page.factory_byte());
            println!("manufacturer ID:       {:04x}", page.manufacturer_id());
            let registration = dev.read_registration_number(bus)?;
            println!("registration number:   {:016x}", registration);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Open the I2C bus
    let i2c = linux_embedded_hal::I2cdev::new(&args.path).expect("Failed to open I2C device");
    // Create a DS2484 instance
    let mut ds2484 = ds2484::Ds2484Builder::default()
        .build(i2c, linux_embedded_hal::Delay)
        .expect("Failed to create DS2484 instance");
    let mut delay = linux_embedded_hal::Delay;
    match run(&mut ds2484, &mut delay, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            if e.is_transient() {
                log::info!("the operation may succeed if repeated");
            }
            ExitCode::FAILURE
        }
    }
}
